//! Anchor construction from a live selection

use super::path::StructuralPath;
use super::record::HighlightRecord;
use crate::dom::{Document, Range};
use crate::render::{HighlightConfig, HighlightRenderer};

/// Builds durable anchors and renders them right away
pub struct AnchorBuilder<'a> {
    config: &'a HighlightConfig,
}

impl<'a> AnchorBuilder<'a> {
    pub fn new(config: &'a HighlightConfig) -> Self {
        Self { config }
    }

    /// Describe `range` as a record without touching the document
    ///
    /// Returns `None` for detached or malformed ranges and for selections
    /// that contain nothing but whitespace.
    pub fn describe(
        &self,
        document: &Document,
        range: &Range,
        id: &str,
        url: &str,
    ) -> Option<HighlightRecord> {
        if !range.is_valid(document) {
            tracing::debug!("Ignoring detached or malformed selection");
            return None;
        }

        let text = range.to_text(document);
        if text.trim().is_empty() {
            return None;
        }

        let path = StructuralPath::for_node(document, range.start.node)
            .map(|p| p.to_string())
            .unwrap_or_default();

        let offset = match document.text(range.start.node) {
            Some(content) => content
                .get(..range.start.offset)
                .map(|head| head.chars().count())
                .unwrap_or(0),
            None => range.start.offset,
        };

        Some(HighlightRecord::new(id, text, url, path, offset))
    }

    /// Build the record for `range` and render the highlight immediately
    pub fn anchor(
        &self,
        document: &mut Document,
        range: &Range,
        id: &str,
        url: &str,
    ) -> Option<HighlightRecord> {
        let record = self.describe(document, range, id, url)?;
        let containers = HighlightRenderer::new(self.config).render(document, range, id);
        tracing::debug!(
            "Anchored highlight {} at {} ({} containers)",
            id,
            record.structural_path,
            containers.len()
        );
        Some(record)
    }
}
