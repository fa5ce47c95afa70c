//! Structural paths
//!
//! A structural path addresses an element by tag names and 1-based positions
//! among same-tag siblings, e.g. `/html/body/div[2]/p`. The position is left
//! out when it is 1. Attributes and IDs are never used since pages may lack
//! or regenerate them.
//!
//! Grammar:
//! ```text
//! path = step+
//! step = "/" name ["[" number "]"]
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::dom::{Document, NodeId};

/// Path parsing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathParseError {
    #[error("Empty structural path")]
    Empty,

    #[error("Expected '/' at position {0}")]
    ExpectedSlash(usize),

    #[error("Expected tag name at position {0}")]
    ExpectedName(usize),

    #[error("Invalid position at {0}")]
    InvalidPosition(usize),

    #[error("Unclosed bracket at position {0}")]
    UnclosedBracket(usize),
}

/// One `/tag[position]` step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub tag: String,
    /// 1-based index among siblings with the same tag
    pub position: usize,
}

/// A root-to-element route through the tree
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructuralPath {
    steps: Vec<PathStep>,
}

impl StructuralPath {
    pub fn new(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Path of the element holding `node`; text nodes map to their parent
    pub fn for_node(document: &Document, node: NodeId) -> Option<Self> {
        let mut current = if document.is_text(node) {
            document.parent(node)?
        } else {
            node
        };

        let mut steps = Vec::new();
        while let Some(element) = document.element(current) {
            let parent = document.parent(current);
            let preceding = parent
                .map(|p| {
                    document
                        .children(p)
                        .iter()
                        .take_while(|&&sibling| sibling != current)
                        .filter(|&&sibling| document.tag_name(sibling) == Some(element.name.as_str()))
                        .count()
                })
                .unwrap_or(0);
            steps.push(PathStep {
                tag: element.name.clone(),
                position: preceding + 1,
            });
            match parent {
                Some(p) => current = p,
                None => break,
            }
        }

        if steps.is_empty() {
            return None;
        }
        steps.reverse();
        Some(Self { steps })
    }

    /// Evaluate against a document, returning the addressed element
    pub fn resolve(&self, document: &Document) -> Option<NodeId> {
        if self.steps.is_empty() {
            return None;
        }
        self.steps.iter().try_fold(document.root(), |current, step| {
            document
                .children(current)
                .iter()
                .copied()
                .filter(|&child| {
                    document
                        .tag_name(child)
                        .map(|tag| tag.eq_ignore_ascii_case(&step.tag))
                        .unwrap_or(false)
                })
                .nth(step.position.checked_sub(1)?)
        })
    }
}

impl fmt::Display for StructuralPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "/{}", step.tag)?;
            if step.position > 1 {
                write!(f, "[{}]", step.position)?;
            }
        }
        Ok(())
    }
}

impl FromStr for StructuralPath {
    type Err = PathParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if input.is_empty() {
            return Err(PathParseError::Empty);
        }

        let bytes = input.as_bytes();
        let mut pos = 0;
        let mut steps = Vec::new();

        while pos < bytes.len() {
            if bytes[pos] != b'/' {
                return Err(PathParseError::ExpectedSlash(pos));
            }
            pos += 1;

            let name_start = pos;
            while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || matches!(bytes[pos], b'-' | b'_' | b':')) {
                pos += 1;
            }
            if pos == name_start {
                return Err(PathParseError::ExpectedName(name_start));
            }
            let tag = input[name_start..pos].to_ascii_lowercase();

            let mut position = 1;
            if pos < bytes.len() && bytes[pos] == b'[' {
                let open = pos;
                pos += 1;
                let digits_start = pos;
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
                if pos >= bytes.len() {
                    return Err(PathParseError::UnclosedBracket(open));
                }
                if bytes[pos] != b']' {
                    return Err(PathParseError::InvalidPosition(pos));
                }
                position = input[digits_start..pos]
                    .parse::<usize>()
                    .ok()
                    .filter(|&p| p >= 1)
                    .ok_or(PathParseError::InvalidPosition(digits_start))?;
                pos += 1;
            }

            steps.push(PathStep { tag, position });
        }

        Ok(Self { steps })
    }
}
