//! Anchor resolution
//!
//! Relocates a stored anchor inside a freshly parsed document. The structural
//! path is tried first since it pins down the original location; when it no
//! longer resolves, or no acceptable match lives under it, the whole body is
//! scanned for the quoted text. The first acceptable match wins in both
//! phases, so verbatim repeats elsewhere on the page can produce a false
//! positive in the fallback.

use super::path::StructuralPath;
use super::record::HighlightRecord;
use crate::dom::{BlockPolicy, Document, NodeId, Range, TextWalker};

/// Which phase located the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvePhase {
    Structural,
    Fallback,
}

/// A relocated anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub range: Range,
    pub phase: ResolvePhase,
}

/// Two-phase anchor resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorResolver {
    policy: BlockPolicy,
}

impl AnchorResolver {
    pub fn new(policy: BlockPolicy) -> Self {
        Self { policy }
    }

    /// Locate `record` in `document`
    pub fn resolve(&self, document: &Document, record: &HighlightRecord) -> Option<Resolution> {
        if record.text.is_empty() {
            return None;
        }

        if let Some(range) = self.structural(document, record) {
            return Some(Resolution {
                range,
                phase: ResolvePhase::Structural,
            });
        }

        tracing::debug!(
            "Structural path {:?} missed for {}, scanning document",
            record.structural_path,
            record.id
        );

        self.fallback(document, record).map(|range| Resolution {
            range,
            phase: ResolvePhase::Fallback,
        })
    }

    fn structural(&self, document: &Document, record: &HighlightRecord) -> Option<Range> {
        let path = match record.structural_path.parse::<StructuralPath>() {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!("Unusable structural path for {}: {}", record.id, e);
                return None;
            }
        };
        let element = path.resolve(document)?;
        self.first_match(document, element, &record.text)
    }

    fn fallback(&self, document: &Document, record: &HighlightRecord) -> Option<Range> {
        let root = document
            .body()
            .or_else(|| document.document_element())
            .unwrap_or_else(|| document.root());
        self.first_match(document, root, &record.text)
    }

    fn first_match(&self, document: &Document, root: NodeId, needle: &str) -> Option<Range> {
        TextWalker::excluding_multi_block(document, root, self.policy).find_map(|node| {
            let start = document.text(node)?.find(needle)?;
            let range = Range::within_text(node, start, start + needle.len());
            self.policy.accepts_text(document, node).then_some(range)
        })
    }
}
