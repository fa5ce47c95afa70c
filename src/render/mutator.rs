//! Highlight removal and in-place edits

use thiserror::Error;

use super::renderer::{HighlightConfig, HighlightRenderer};
use crate::dom::{Document, NodeId, Range};

/// Errors from mutating rendered highlights
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MutateError {
    #[error("Highlight not rendered: {0}")]
    NotRendered(String),

    #[error("Highlight container detached: {0}")]
    Detached(String),
}

/// Removes and edits rendered highlights
pub struct HighlightMutator<'a> {
    config: &'a HighlightConfig,
}

impl<'a> HighlightMutator<'a> {
    pub fn new(config: &'a HighlightConfig) -> Self {
        Self { config }
    }

    /// All containers carrying `id`, in document order
    pub fn containers(&self, document: &Document, id: &str) -> Vec<NodeId> {
        document.elements_with_attr(&self.config.id_attribute, id)
    }

    /// Distinct IDs of every rendered highlight, in document order
    pub fn rendered_ids(&self, document: &Document) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for node in document.descendants(document.root()) {
            let Some(el) = document.element(node) else {
                continue;
            };
            if !el.has_class(&self.config.class_name) {
                continue;
            }
            if let Some(id) = el.attr(&self.config.id_attribute) {
                if !ids.iter().any(|known| known == id) {
                    ids.push(id.to_string());
                }
            }
        }
        ids
    }

    /// Unwrap every container of `id`; returns how many were removed
    pub fn remove(&self, document: &mut Document, id: &str) -> usize {
        let containers = self.containers(document, id);
        for &container in &containers {
            unwrap_container(document, container);
        }
        containers.len()
    }

    /// Unwrap every rendered highlight; returns how many IDs were removed
    pub fn remove_all(&self, document: &mut Document) -> usize {
        let ids = self.rendered_ids(document);
        for id in &ids {
            self.remove(document, id);
        }
        ids.len()
    }

    /// Replace the highlighted text of `id`, keeping its ID and position
    ///
    /// The first container's slot receives a new text node which is then
    /// rendered again under the same ID. Any further containers of a
    /// multi-node highlight are dropped along with their text.
    pub fn update_text(
        &self,
        document: &mut Document,
        id: &str,
        new_text: &str,
    ) -> Result<NodeId, MutateError> {
        let containers = self.containers(document, id);
        let Some(&first) = containers.first() else {
            return Err(MutateError::NotRendered(id.to_string()));
        };
        let parent = document
            .parent(first)
            .ok_or_else(|| MutateError::Detached(id.to_string()))?;
        let index = document
            .index_in_parent(first)
            .ok_or_else(|| MutateError::Detached(id.to_string()))?;

        for &container in &containers {
            document.detach(container);
        }

        let text = document.create_text(new_text);
        document.insert_at(parent, index, text);

        let range = Range::select_node_contents(document, text);
        HighlightRenderer::new(self.config).render(document, &range, id);
        Ok(text)
    }
}

/// Move a container's children into its place and drop it
fn unwrap_container(document: &mut Document, container: NodeId) {
    let Some(parent) = document.parent(container) else {
        return;
    };
    let Some(index) = document.index_in_parent(container) else {
        return;
    };

    let children = document.children(container).to_vec();
    for (offset, child) in children.into_iter().enumerate() {
        document.insert_at(parent, index + offset, child);
    }
    document.detach(container);
    document.merge_text_children(parent);
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
    fn test_render_then_remove_restores_text() {
        let mut doc = Document::parse("<p>Hello world, this is a test.</p>");
        let before = doc.to_html();
        let p = first_tag(&doc, "p");
        let text = doc.first_child(p).unwrap();
        let config = HighlightConfig::default();

        HighlightRenderer::new(&config).render(&mut doc, &Range::within_text(text, 6, 11), "h1");
        assert_ne!(doc.to_html(), before);

        let removed = HighlightMutator::new(&config).remove(&mut doc, "h1");
        assert_eq!(removed, 1);
        assert_eq!(doc.to_html(), before);
        assert_eq!(doc.children(p).len(), 1);
    }

    #[test]
    fn test_remove_multi_node_highlight() {
        let mut doc = Document::parse("<p>alpha</p><p>beta</p>");
        let before_text = doc.text_content(doc.root());
        let body = doc.body().unwrap();
        let first = doc.first_child(doc.children(body)[0]).unwrap();
        let second = doc.first_child(doc.children(body)[1]).unwrap();
        let range = Range::new(Boundary::new(first, 2), Boundary::new(second, 2));
        let config = HighlightConfig::default();

        let containers = HighlightRenderer::new(&config).render(&mut doc, &range, "h2");
        assert_eq!(containers.len(), 2);

        let mutator = HighlightMutator::new(&config);
        assert_eq!(mutator.remove(&mut doc, "h2"), 2);
        assert!(mutator.containers(&doc, "h2").is_empty());
        assert_eq!(doc.text_content(doc.root()), before_text);
    }

    #[test]
    fn test_remove_all() {
        let mut doc = Document::parse("<p>one two three</p>");
        let p = first_tag(&doc, "p");
        let text = doc.first_child(p).unwrap();
        let config = HighlightConfig::default();
        let renderer = HighlightRenderer::new(&config);

        let tail = doc.split_text(text, 4).unwrap();
        renderer.render(&mut doc, &Range::within_text(text, 0, 3), "a");
        renderer.render(&mut doc, &Range::within_text(tail, 4, 9), "b");

        let mutator = HighlightMutator::new(&config);
        assert_eq!(mutator.rendered_ids(&doc), vec!["a", "b"]);
        assert_eq!(mutator.remove_all(&mut doc), 2);
        assert!(mutator.rendered_ids(&doc).is_empty());
        assert_eq!(doc.inner_html(p), "one two three");
    }

    #[test]
    fn test_update_text_in_place() {
        let mut doc = Document::parse("<p>Hello world, bye.</p>");
        let p = first_tag(&doc, "p");
        let text = doc.first_child(p).unwrap();
        let config = HighlightConfig::default();
        HighlightRenderer::new(&config).render(&mut doc, &Range::within_text(text, 6, 11), "h1");

        let mutator = HighlightMutator::new(&config);
        mutator.update_text(&mut doc, "h1", "there").unwrap();

        let containers = mutator.containers(&doc, "h1");
        assert_eq!(containers.len(), 1);
        assert_eq!(doc.text_content(containers[0]), "there");
        assert_eq!(doc.text_content(p), "Hello there, bye.");
    }

    #[test]
    fn test_update_missing_highlight() {
        let mut doc = Document::parse("<p>Hello</p>");
        let config = HighlightConfig::default();
        let result = HighlightMutator::new(&config).update_text(&mut doc, "nope", "x");
        assert_eq!(result, Err(MutateError::NotRendered("nope".to_string())));
    }
}
