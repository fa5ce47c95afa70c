//! Lazy walk over text-bearing leaves
//!
//! A [`TextWalker`] yields text nodes strictly under a root in document
//! order. It holds no state besides its cursor, so callers re-walk by calling
//! [`TextWalker::reset`] or building a fresh walker.

use super::block::BlockPolicy;
use super::document::{following_in_subtree, Document, NodeId};
use super::range::Range;

/// Which text nodes a walk accepts
#[derive(Debug, Clone, Copy)]
pub enum TextFilter {
    /// Every text node
    All,
    /// Only nodes intersecting the range
    Intersecting(Range),
    /// Only nodes whose parent is not a multi-block container
    ExcludeMultiBlock(BlockPolicy),
}

impl TextFilter {
    fn accepts(&self, document: &Document, node: NodeId) -> bool {
        match self {
            TextFilter::All => true,
            TextFilter::Intersecting(range) => range.intersects_node(document, node),
            TextFilter::ExcludeMultiBlock(policy) => policy.accepts_text(document, node),
        }
    }
}

/// Restartable iterator over text nodes under a root
#[derive(Debug, Clone)]
pub struct TextWalker<'a> {
    document: &'a Document,
    root: NodeId,
    filter: TextFilter,
    cursor: Option<NodeId>,
    done: bool,
}

impl<'a> TextWalker<'a> {
    pub fn new(document: &'a Document, root: NodeId, filter: TextFilter) -> Self {
        Self {
            document,
            root,
            filter,
            cursor: None,
            done: false,
        }
    }

    /// Walk limited to text intersecting `range`
    pub fn in_range(document: &'a Document, root: NodeId, range: Range) -> Self {
        Self::new(document, root, TextFilter::Intersecting(range))
    }

    /// Walk that skips text sitting directly in multi-block containers
    pub fn excluding_multi_block(document: &'a Document, root: NodeId, policy: BlockPolicy) -> Self {
        Self::new(document, root, TextFilter::ExcludeMultiBlock(policy))
    }

    /// Rewind to the beginning
    pub fn reset(&mut self) {
        self.cursor = None;
        self.done = false;
    }
}

impl Iterator for TextWalker<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.done {
            return None;
        }
        loop {
            let next = match self.cursor {
                None => self.document.first_child(self.root),
                Some(current) => following_in_subtree(self.document, current, self.root),
            };
            let Some(node) = next else {
                self.done = true;
                return None;
            };
            self.cursor = Some(node);
            if self.document.is_text(node) && self.filter.accepts(self.document, node) {
                return Some(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::range::Boundary;

    #[test]
    fn test_walk_in_document_order() {
        let doc = Document::parse("<p>one <b>two</b></p><p>three</p>");
        let body = doc.body().unwrap();
        let texts: Vec<_> = TextWalker::new(&doc, body, TextFilter::All)
            .filter_map(|id| doc.text(id))
            .collect();
        assert_eq!(texts, vec!["one ", "two", "three"]);
    }

    #[test]
    fn test_reset_rewalks() {
        let doc = Document::parse("<p>one</p><p>two</p>");
        let mut walker = TextWalker::new(&doc, doc.body().unwrap(), TextFilter::All);
        assert_eq!(walker.by_ref().count(), 2);
        assert_eq!(walker.next(), None);
        walker.reset();
        assert_eq!(walker.count(), 2);
    }

    #[test]
    fn test_root_text_is_not_yielded() {
        let doc = Document::parse("<p>one</p>");
        let p = doc.first_child(doc.body().unwrap()).unwrap();
        let text = doc.first_child(p).unwrap();
        assert_eq!(TextWalker::new(&doc, text, TextFilter::All).count(), 0);
    }

    #[test]
    fn test_range_filter() {
        let doc = Document::parse("<p>one</p><p>two</p><p>three</p>");
        let body = doc.body().unwrap();
        let first = doc.first_child(doc.children(body)[0]).unwrap();
        let second = doc.first_child(doc.children(body)[1]).unwrap();
        let range = Range::new(Boundary::new(first, 1), Boundary::new(second, 1));

        let hits: Vec<_> = TextWalker::in_range(&doc, body, range).collect();
        assert_eq!(hits, vec![first, second]);
    }

    #[test]
    fn test_multi_block_filter() {
        let doc = Document::parse("<div>loose<p>one</p><p>two</p></div>");
        let body = doc.body().unwrap();
        let texts: Vec<_> = TextWalker::excluding_multi_block(&doc, body, BlockPolicy::default())
            .filter_map(|id| doc.text(id))
            .collect();
        assert_eq!(texts, vec!["one", "two"]);
    }
}
