//! Serializable selections
//!
//! Remote clients can't hand over live node handles, so a selection travels
//! as two boundary descriptions: the structural path of an element, an
//! optional child index inside it, and an offset. Offsets into text nodes are
//! character counts; offsets into elements are child indices.

use serde::{Deserialize, Serialize};

use crate::anchor::StructuralPath;
use crate::dom::{Boundary, Document, Range};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundarySpec {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<usize>,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSpec {
    pub start: BoundarySpec,
    pub end: BoundarySpec,
}

impl BoundarySpec {
    /// Resolve into a live boundary point
    pub fn to_boundary(&self, document: &Document) -> Option<Boundary> {
        let path: StructuralPath = self.path.parse().ok()?;
        let element = path.resolve(document)?;
        let node = match self.child {
            Some(index) => *document.children(element).get(index)?,
            None => element,
        };

        let offset = match document.text(node) {
            Some(text) => {
                if self.offset == text.chars().count() {
                    text.len()
                } else {
                    text.char_indices().nth(self.offset)?.0
                }
            }
            None if self.offset <= document.children(node).len() => self.offset,
            None => return None,
        };
        Some(Boundary::new(node, offset))
    }
}

impl SelectionSpec {
    /// Resolve into a live range; `None` if either end can't be located
    pub fn to_range(&self, document: &Document) -> Option<Range> {
        let range = Range::new(
            self.start.to_boundary(document)?,
            self.end.to_boundary(document)?,
        );
        range.is_valid(document).then_some(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(path: &str, child: Option<usize>, offset: usize) -> BoundarySpec {
        BoundarySpec {
            path: path.to_string(),
            child,
            offset,
        }
    }

    #[test]
    fn test_text_boundaries_use_char_offsets() {
        let doc = Document::parse("<p>naïve idea</p>");
        let selection = SelectionSpec {
            start: spec("/html/body/p", Some(0), 6),
            end: spec("/html/body/p", Some(0), 10),
        };
        let range = selection.to_range(&doc).unwrap();
        assert_eq!(range.to_text(&doc), "idea");
    }

    #[test]
    fn test_element_boundaries() {
        let doc = Document::parse("<p>one</p><p>two</p>");
        let selection = SelectionSpec {
            start: spec("/html/body", None, 1),
            end: spec("/html/body", None, 2),
        };
        assert_eq!(selection.to_range(&doc).unwrap().to_text(&doc), "two");
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let doc = Document::parse("<p>one</p>");
        let selection = SelectionSpec {
            start: spec("/html/body/p", Some(0), 0),
            end: spec("/html/body/p", Some(0), 9),
        };
        assert!(selection.to_range(&doc).is_none());
        let selection = SelectionSpec {
            start: spec("/html/body/p", Some(3), 0),
            end: spec("/html/body/p", Some(0), 1),
        };
        assert!(selection.to_range(&doc).is_none());
    }
}
