//! Arena-backed document tree
//!
//! Pages are parsed once into a flat arena of nodes addressed by [`NodeId`].
//! Nodes carry no stable identity across parses; everything that must survive
//! a reload is expressed as a structural path or a text quote instead.

use scraper::Html;

/// Handle to a node inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Payload of a single node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Doctype(String),
    Element(Element),
    Text(String),
    Comment(String),
}

/// An element with a lower-case tag name and ordered attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// A mutable HTML document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
        }
    }

    /// Parse an HTML page
    ///
    /// The HTML5 parser always produces `html`, `head` and `body`, so callers
    /// can rely on [`Document::body`] for well-formed and fragment input alike.
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut document = Self::new();
        let root = document.root();
        for child in parsed.tree.root().children() {
            document.import(child, root);
        }
        document
    }

    fn import(&mut self, source: ego_tree::NodeRef<'_, scraper::Node>, parent: NodeId) {
        let data = match source.value() {
            scraper::Node::Element(el) => NodeData::Element(Element {
                name: el.name().to_ascii_lowercase(),
                attrs: el
                    .attrs()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect(),
            }),
            scraper::Node::Text(text) => NodeData::Text(String::from(&**text)),
            scraper::Node::Comment(comment) => NodeData::Comment(String::from(&**comment)),
            scraper::Node::Doctype(doctype) => NodeData::Doctype(doctype.name().to_string()),
            _ => return,
        };

        let id = self.alloc(data);
        self.append_child(parent, id);
        for child in source.children() {
            self.import(child, id);
        }
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The `<html>` element, if any
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&id| self.is_element(id))
    }

    /// The `<body>` element, if any
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|&id| self.tag_name(id) == Some("body"))
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Position of a node among its parent's children
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.data(id) {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.name.as_str())
    }

    /// Character data of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id), NodeData::Text(_))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.data(id), NodeData::Element(_))
    }

    /// Length used for boundary offsets: bytes for text, child count otherwise
    pub fn node_length(&self, id: NodeId) -> usize {
        match self.data(id) {
            NodeData::Text(text) | NodeData::Comment(text) => text.len(),
            NodeData::Doctype(_) => 0,
            _ => self.children(id).len(),
        }
    }

    /// Ancestors of a node, nearest first, excluding the node itself
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.parent(id),
        }
    }

    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|id| id == ancestor)
    }

    /// Whether the node is still reachable from the document node
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root() || self.ancestors(id).any(|a| a == self.root())
    }

    /// Nodes under `id` in document order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            document: self,
            root: id,
            next: self.first_child(id),
        }
    }

    /// Concatenated character data of all text under a node
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|node| self.text(node))
            .collect()
    }

    /// Elements carrying `attr="value"`, in document order
    pub fn elements_with_attr(&self, attr: &str, value: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .filter(|&id| {
                self.element(id)
                    .and_then(|el| el.attr(attr))
                    .map(|v| v == value)
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.alloc(NodeData::Element(Element::new(name)))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let NodeData::Text(existing) = &mut self.nodes[id.0].data {
            *existing = text.into();
        }
    }

    /// Remove a node from its parent; the subtree stays in the arena
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert_at(parent, len, child);
    }

    /// Insert `child` at `index` among `parent`'s children, moving it if attached
    ///
    /// The index is clamped to the child count. A node can't be inserted
    /// under itself or one of its descendants; such calls are ignored.
    pub fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if child == parent || self.is_ancestor_of(child, parent) {
            return;
        }
        let mut index = index;
        if self.parent(child) == Some(parent) {
            if let Some(current) = self.index_in_parent(child) {
                if current < index {
                    index -= 1;
                }
            }
        }
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Split a text node at a byte offset, DOM `splitText` style
    ///
    /// The original node keeps `[0, offset)`; a new sibling holding the rest
    /// is inserted right after it and returned.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Option<NodeId> {
        let text = self.text(id)?;
        if offset > text.len() || !text.is_char_boundary(offset) {
            return None;
        }
        let tail = text[offset..].to_string();
        let head = text[..offset].to_string();
        self.set_text(id, head);

        let new_node = self.create_text(tail);
        if let Some(parent) = self.parent(id) {
            let index = self.index_in_parent(id).unwrap_or(0);
            self.insert_at(parent, index + 1, new_node);
        }
        Some(new_node)
    }

    /// Merge adjacent text children and drop empty ones, DOM `normalize` style
    pub fn merge_text_children(&mut self, parent: NodeId) {
        let children = self.children(parent).to_vec();
        let mut previous_text: Option<NodeId> = None;
        for child in children {
            let Some(text) = self.text(child).map(str::to_string) else {
                previous_text = None;
                continue;
            };
            if text.is_empty() {
                self.detach(child);
                continue;
            }
            match previous_text {
                Some(prev) => {
                    let merged = format!("{}{}", self.text(prev).unwrap_or_default(), text);
                    self.set_text(prev, merged);
                    self.detach(child);
                }
                None => previous_text = Some(child),
            }
        }
    }
}

/// Iterator over a node's ancestors
pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    document: &'a Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = following_in_subtree(self.document, current, self.root);
        Some(current)
    }
}

/// Next node in pre-order after `node`, never leaving the subtree of `root`
pub(crate) fn following_in_subtree(
    document: &Document,
    node: NodeId,
    root: NodeId,
) -> Option<NodeId> {
    if let Some(child) = document.first_child(node) {
        return Some(child);
    }
    let mut current = node;
    while current != root {
        if let Some(sibling) = document.next_sibling(current) {
            return Some(sibling);
        }
        current = document.parent(current)?;
    }
    None
}
