//! Live ranges over a [`Document`]
//!
//! A range is a pair of boundary points. Inside text nodes the offset is a
//! byte offset on a character boundary; inside any other node it is a child
//! index. Comparison follows the DOM boundary-point ordering.

use std::cmp::Ordering;

use super::document::{Document, NodeId};

/// A position between two pieces of content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub node: NodeId,
    pub offset: usize,
}

impl Boundary {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A contiguous span of document content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Boundary,
    pub end: Boundary,
}

impl Range {
    pub fn new(start: Boundary, end: Boundary) -> Self {
        Self { start, end }
    }

    /// A range inside a single text node
    pub fn within_text(node: NodeId, start: usize, end: usize) -> Self {
        Self::new(Boundary::new(node, start), Boundary::new(node, end))
    }

    /// A range covering all content of a node
    pub fn select_node_contents(document: &Document, node: NodeId) -> Self {
        Self::new(
            Boundary::new(node, 0),
            Boundary::new(node, document.node_length(node)),
        )
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Check that both ends are attached, in bounds and correctly ordered
    pub fn is_valid(&self, document: &Document) -> bool {
        let in_bounds = |b: &Boundary| {
            document.is_attached(b.node)
                && b.offset <= document.node_length(b.node)
                && document
                    .text(b.node)
                    .map(|t| t.is_char_boundary(b.offset))
                    .unwrap_or(true)
        };
        in_bounds(&self.start)
            && in_bounds(&self.end)
            && compare_boundaries(document, &self.start, &self.end) != Some(Ordering::Greater)
    }

    /// Deepest node containing both ends
    pub fn common_ancestor(&self, document: &Document) -> Option<NodeId> {
        let start = self.start.node;
        let end = self.end.node;
        if start == end || document.is_ancestor_of(start, end) {
            return Some(start);
        }
        document
            .ancestors(start)
            .find(|&ancestor| ancestor == end || document.is_ancestor_of(ancestor, end))
    }

    /// DOM `intersectsNode`
    pub fn intersects_node(&self, document: &Document, node: NodeId) -> bool {
        let Some(parent) = document.parent(node) else {
            return false;
        };
        let Some(index) = document.index_in_parent(node) else {
            return false;
        };
        let before = Boundary::new(parent, index);
        let after = Boundary::new(parent, index + 1);
        compare_boundaries(document, &before, &self.end) == Some(Ordering::Less)
            && compare_boundaries(document, &after, &self.start) == Some(Ordering::Greater)
    }

    /// Whether the whole node lies between the two boundary points
    pub fn contains_node(&self, document: &Document, node: NodeId) -> bool {
        let Some(parent) = document.parent(node) else {
            return false;
        };
        let Some(index) = document.index_in_parent(node) else {
            return false;
        };
        let before = Boundary::new(parent, index);
        let after = Boundary::new(parent, index + 1);
        compare_boundaries(document, &before, &self.start) == Some(Ordering::Greater)
            && compare_boundaries(document, &after, &self.end) == Some(Ordering::Less)
    }

    /// The plain text covered by the range, DOM `Range.toString` style
    pub fn to_text(&self, document: &Document) -> String {
        if self.start.node == self.end.node {
            if let Some(text) = document.text(self.start.node) {
                return text
                    .get(self.start.offset..self.end.offset)
                    .unwrap_or_default()
                    .to_string();
            }
        }

        let mut out = String::new();
        if let Some(text) = document.text(self.start.node) {
            out.push_str(text.get(self.start.offset..).unwrap_or_default());
        }
        if let Some(common) = self.common_ancestor(document) {
            for node in document.descendants(common) {
                if let Some(text) = document.text(node) {
                    if self.contains_node(document, node) {
                        out.push_str(text);
                    }
                }
            }
        }
        if let Some(text) = document.text(self.end.node) {
            out.push_str(text.get(..self.end.offset).unwrap_or_default());
        }
        out
    }
}

/// Child indices from the top of the tree down to `node`
fn index_path(document: &Document, node: NodeId) -> (NodeId, Vec<usize>) {
    let mut path = Vec::new();
    let mut current = node;
    while let Some(index) = document.index_in_parent(current) {
        path.push(index);
        match document.parent(current) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    path.reverse();
    (current, path)
}

/// Tree order of two nodes; `None` when they live in different trees
pub fn tree_order(document: &Document, a: NodeId, b: NodeId) -> Option<Ordering> {
    if a == b {
        return Some(Ordering::Equal);
    }
    let (top_a, path_a) = index_path(document, a);
    let (top_b, path_b) = index_path(document, b);
    if top_a != top_b {
        return None;
    }
    Some(path_a.cmp(&path_b))
}

/// Compare two boundary points in the same tree
pub fn compare_boundaries(document: &Document, a: &Boundary, b: &Boundary) -> Option<Ordering> {
    if a.node == b.node {
        return Some(a.offset.cmp(&b.offset));
    }
    match tree_order(document, a.node, b.node)? {
        Ordering::Greater => compare_boundaries(document, b, a).map(Ordering::reverse),
        _ => {
            if document.is_ancestor_of(a.node, b.node) {
                let mut child = b.node;
                while document.parent(child) != Some(a.node) {
                    child = document.parent(child)?;
                }
                let index = document.index_in_parent(child)?;
                if index < a.offset {
                    return Some(Ordering::Greater);
                }
            }
            Some(Ordering::Less)
        }
    }
}
