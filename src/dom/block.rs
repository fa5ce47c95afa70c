//! Block-level container policy
//!
//! Text whose parent directly holds several block-level children sits on a
//! structural seam between independent content blocks. Matches there are
//! rejected, since a restored selection straddling such a seam is rarely what
//! the user highlighted. The threshold is a tunable heuristic.

use super::document::{Document, NodeId};

/// Tags treated as block-level boundaries
pub const BLOCK_TAGS: [&str; 10] = [
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "div", "section", "article",
];

pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.iter().any(|block| block.eq_ignore_ascii_case(tag))
}

/// Policy deciding which containers count as multi-block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPolicy {
    /// Number of direct block-level children at which a container is rejected
    pub min_block_children: usize,
}

impl Default for BlockPolicy {
    fn default() -> Self {
        Self {
            min_block_children: 2,
        }
    }
}

impl BlockPolicy {
    pub fn new(min_block_children: usize) -> Self {
        Self {
            min_block_children: min_block_children.max(1),
        }
    }

    /// Whether `node` directly contains enough block-level elements to be a seam
    pub fn is_multi_block_container(&self, document: &Document, node: NodeId) -> bool {
        let blocks = document
            .children(node)
            .iter()
            .filter_map(|&child| document.tag_name(child))
            .filter(|tag| is_block_tag(tag))
            .count();
        blocks >= self.min_block_children
    }

    /// Whether a text node's immediate parent is an acceptable container
    pub fn accepts_text(&self, document: &Document, text: NodeId) -> bool {
        document
            .parent(text)
            .map(|parent| !self.is_multi_block_container(document, parent))
            .unwrap_or(false)
    }
}

/// Nearest block-level element at or above `node`, stopping below the document node
pub fn closest_block_ancestor(document: &Document, node: NodeId) -> Option<NodeId> {
    std::iter::once(node)
        .chain(document.ancestors(node))
        .filter(|&id| document.parent(id).is_some())
        .find(|&id| document.tag_name(id).map(is_block_tag).unwrap_or(false))
}
