//! Document model
//!
//! Provides the live tree the highlighter works against:
//! - Arena document parsed from HTML and serialized back
//! - Boundary points and ranges with DOM ordering semantics
//! - Lazy text walker with range and block-exclusion filters
//! - Optional sanitization before parsing

mod block;
mod document;
mod range;
mod sanitize;
mod serialize;
mod walker;

pub use block::{closest_block_ancestor, is_block_tag, BlockPolicy, BLOCK_TAGS};
pub use document::{Ancestors, Descendants, Document, Element, NodeData, NodeId};
pub use range::{compare_boundaries, tree_order, Boundary, Range};
pub use sanitize::{sanitize_html, SanitizeError};
pub use walker::{TextFilter, TextWalker};
