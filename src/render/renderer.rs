//! Highlight rendering
//!
//! Wraps the text covered by a range in tagged `<span>` containers. A range
//! spanning several text nodes yields one container per node, all carrying
//! the same highlight ID.

use crate::dom::{closest_block_ancestor, Document, NodeId, Range, TextWalker};

/// Configuration for rendered highlight containers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightConfig {
    /// Element used as the container
    pub tag: String,
    /// Class marking every highlight container
    pub class_name: String,
    /// Prefix of the block-type modifier class (`<prefix>-p`, `<prefix>-h2`, ...)
    pub modifier_prefix: String,
    /// Attribute carrying the highlight ID
    pub id_attribute: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            tag: "span".to_string(),
            class_name: "web-highlighter-highlight".to_string(),
            modifier_prefix: "highlight".to_string(),
            id_attribute: "data-highlight-id".to_string(),
        }
    }
}

/// A slice of one text node scheduled for wrapping
#[derive(Debug, Clone, Copy)]
struct Slice {
    node: NodeId,
    start: usize,
    end: usize,
}

/// Renders ranges into highlight containers
pub struct HighlightRenderer<'a> {
    config: &'a HighlightConfig,
}

impl<'a> HighlightRenderer<'a> {
    pub fn new(config: &'a HighlightConfig) -> Self {
        Self { config }
    }

    /// Wrap every intersecting text slice of `range`; returns the containers created
    pub fn render(&self, document: &mut Document, range: &Range, id: &str) -> Vec<NodeId> {
        if id.is_empty() || !range.is_valid(document) {
            tracing::warn!("Refusing to render invalid range for highlight {}", id);
            return Vec::new();
        }

        // Slices are computed up front: wrapping splits nodes and shifts child indices
        let slices = self.slices(document, range);
        slices
            .into_iter()
            .filter_map(|slice| self.wrap_slice(document, slice, id))
            .collect()
    }

    fn slices(&self, document: &Document, range: &Range) -> Vec<Slice> {
        let Some(common) = range.common_ancestor(document) else {
            return Vec::new();
        };

        let nodes: Vec<NodeId> = if document.is_text(common) {
            vec![common]
        } else {
            TextWalker::in_range(document, common, *range).collect()
        };

        nodes
            .into_iter()
            .filter_map(|node| {
                let len = document.text(node)?.len();
                let start = if node == range.start.node {
                    range.start.offset
                } else {
                    0
                };
                let end = if node == range.end.node {
                    range.end.offset
                } else {
                    len
                };
                (end > start).then_some(Slice { node, start, end })
            })
            .collect()
    }

    fn wrap_slice(&self, document: &mut Document, slice: Slice, id: &str) -> Option<NodeId> {
        let text = document.text(slice.node)?;
        let len = text.len();
        if slice.end > len || !text.is_char_boundary(slice.start) || !text.is_char_boundary(slice.end)
        {
            tracing::warn!("Slice {}..{} is not on character boundaries", slice.start, slice.end);
            return None;
        }

        let block_tag = closest_block_ancestor(document, slice.node)
            .and_then(|block| document.tag_name(block))
            .map(str::to_string);

        let mut target = slice.node;
        if slice.end < len {
            document.split_text(target, slice.end)?;
        }
        if slice.start > 0 {
            target = document.split_text(target, slice.start)?;
        }

        let parent = document.parent(target)?;
        let index = document.index_in_parent(target)?;
        let container = self.create_container(document, id, block_tag.as_deref());
        document.insert_at(parent, index, container);
        document.append_child(container, target);
        Some(container)
    }

    fn create_container(&self, document: &mut Document, id: &str, block_tag: Option<&str>) -> NodeId {
        let class = match block_tag {
            Some(tag) => format!(
                "{} {}-{}",
                self.config.class_name, self.config.modifier_prefix, tag
            ),
            None => self.config.class_name.clone(),
        };

        let container = document.create_element(&self.config.tag);
        if let Some(el) = document.element_mut(container) {
            el.set_attr("class", class);
            el.set_attr(&self.config.id_attribute, id);
        }
        container
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Boundary;

    fn first_tag(doc: &Document, tag: &str) -> NodeId {
        doc.descendants(doc.root())
            .find(|&id| doc.tag_name(id) == Some(tag))
            .unwrap()
    }

    #[test]
    fn test_render_single_node() {
        let mut doc = Document::parse("<p>Hello world, this is a test.</p>");
        let p = first_tag(&doc, "p");
        let text = doc.first_child(p).unwrap();
        let config = HighlightConfig::default();

        let containers =
            HighlightRenderer::new(&config).render(&mut doc, &Range::within_text(text, 6, 11), "h1");

        assert_eq!(containers.len(), 1);
        assert_eq!(
            doc.inner_html(p),
            r#"Hello <span class="web-highlighter-highlight highlight-p" data-highlight-id="h1">world</span>, this is a test."#
        );
    }

    #[test]
    fn test_render_across_nodes() {
        let mut doc = Document::parse("<p>Hello <b>big</b> world</p>");
        let p = first_tag(&doc, "p");
        let first = doc.children(p)[0];
        let last = doc.children(p)[2];
        let range = Range::new(Boundary::new(first, 3), Boundary::new(last, 3));
        let config = HighlightConfig::default();

        let containers = HighlightRenderer::new(&config).render(&mut doc, &range, "h2");

        assert_eq!(containers.len(), 3);
        assert_eq!(doc.text_content(p), "Hello big world");
        assert_eq!(doc.elements_with_attr("data-highlight-id", "h2"), containers);
        let wrapped: Vec<_> = containers.iter().map(|&c| doc.text_content(c)).collect();
        assert_eq!(wrapped, vec!["lo ", "big", " wo"]);
    }

    #[test]
    fn test_zero_length_slice_is_skipped() {
        let mut doc = Document::parse("<p>one</p><p>two</p>");
        let body = doc.body().unwrap();
        let first = doc.first_child(doc.children(body)[0]).unwrap();
        let second = doc.first_child(doc.children(body)[1]).unwrap();
        let range = Range::new(Boundary::new(first, 3), Boundary::new(second, 2));
        let config = HighlightConfig::default();

        let containers = HighlightRenderer::new(&config).render(&mut doc, &range, "h3");

        assert_eq!(containers.len(), 1);
        assert_eq!(doc.text_content(containers[0]), "tw");
    }

    #[test]
    fn test_no_block_modifier_outside_blocks() {
        let mut doc = Document::parse("<span>loose text</span>");
        let span = first_tag(&doc, "span");
        let text = doc.first_child(span).unwrap();
        let config = HighlightConfig::default();

        let containers =
            HighlightRenderer::new(&config).render(&mut doc, &Range::within_text(text, 0, 5), "h4");
        let el = doc.element(containers[0]).unwrap();
        assert_eq!(el.attr("class"), Some("web-highlighter-highlight"));
    }
}
