//! Highlighter attached to one page
//!
//! Each event the page produces (ready, selection end, inbound command) is
//! handled by one method that runs its steps in order: check the context,
//! touch the document synchronously, then read-modify-write the store.
//! Failures are logged and absorbed; nothing here returns an error to the
//! page.

use std::sync::Arc;

use serde::Serialize;

use super::command::Command;
use super::context::{ContextHandle, PageContext, ReadyState};
use crate::anchor::{generate_highlight_id, AnchorBuilder, AnchorResolver, HighlightMap, HighlightRecord};
use crate::config::HighlighterConfig;
use crate::dom::{Document, Range};
use crate::render::{HighlightMutator, HighlightRenderer};
use crate::store::HighlightStore;

/// Entry point shared by all pages
#[derive(Clone)]
pub struct Highlighter {
    store: Arc<dyn HighlightStore>,
    config: Arc<HighlighterConfig>,
}

impl Highlighter {
    pub fn new(store: Arc<dyn HighlightStore>, config: HighlighterConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Attach to a page; `None` if the context was already initialized
    pub fn attach(
        &self,
        context: &mut PageContext,
        url: &str,
        document: Document,
    ) -> Option<PageSession> {
        if !context.initialize() {
            tracing::debug!("Page context for {} already initialized", url);
            return None;
        }

        let url = self.config.normalizer.normalize(url);
        tracing::info!("Highlighter attached to {}", url);

        Some(PageSession {
            highlighter: self.clone(),
            context: context.handle(),
            url,
            document,
            restore: RestoreState::NotStarted,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RestoreState {
    NotStarted,
    Deferred,
    Done,
}

/// Outcome of restoring the persisted highlights of a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub restored: Vec<String>,
    pub unresolved: Vec<String>,
}

/// A live page with the highlighter attached
pub struct PageSession {
    highlighter: Highlighter,
    context: ContextHandle,
    url: String,
    document: Document,
    restore: RestoreState,
}

impl PageSession {
    /// Normalized page URL
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Start the session; restores now unless the document is still loading
    pub async fn start(&mut self, state: ReadyState) -> Option<RestoreReport> {
        match state {
            ReadyState::Loading => {
                if self.restore == RestoreState::NotStarted {
                    self.restore = RestoreState::Deferred;
                }
                None
            }
            ReadyState::Interactive | ReadyState::Complete => self.restore_once().await,
        }
    }

    /// The document finished loading; runs a deferred restore
    pub async fn document_ready(&mut self) -> Option<RestoreReport> {
        if self.restore != RestoreState::Deferred {
            return None;
        }
        self.restore_once().await
    }

    async fn restore_once(&mut self) -> Option<RestoreReport> {
        if self.restore == RestoreState::Done {
            return None;
        }
        self.restore = RestoreState::Done;
        Some(self.restore_highlights().await)
    }

    async fn restore_highlights(&mut self) -> RestoreReport {
        let mut report = RestoreReport::default();
        if !self.context.is_valid() {
            return report;
        }

        let highlights = match self.highlighter.store.get().await {
            Ok(highlights) => highlights,
            Err(e) => {
                tracing::warn!("Failed to load highlights for {}: {}", self.url, e);
                return report;
            }
        };
        if !self.context.is_valid() {
            tracing::debug!("Context invalidated while loading highlights");
            return report;
        }

        let config = Arc::clone(&self.highlighter.config);
        let resolver = AnchorResolver::new(config.block_policy);
        let renderer = HighlightRenderer::new(&config.highlight);

        for record in highlights.values().filter(|r| r.url == self.url) {
            match resolver.resolve(&self.document, record) {
                Some(resolution) => {
                    renderer.render(&mut self.document, &resolution.range, &record.id);
                    report.restored.push(record.id.clone());
                }
                None => {
                    tracing::debug!("Could not relocate highlight {}", record.id);
                    report.unresolved.push(record.id.clone());
                }
            }
        }

        tracing::info!(
            "Restored {} highlights on {} ({} unresolved)",
            report.restored.len(),
            self.url,
            report.unresolved.len()
        );
        report
    }

    /// The user finished selecting `range`
    ///
    /// Renders right away and then persists. The record is returned once
    /// rendered, even if persisting it failed.
    pub async fn on_selection(&mut self, range: &Range) -> Option<HighlightRecord> {
        if !self.context.is_valid() {
            return None;
        }

        let config = Arc::clone(&self.highlighter.config);
        let id = generate_highlight_id();
        let record =
            AnchorBuilder::new(&config.highlight).anchor(&mut self.document, range, &id, &self.url)?;

        let stored = record.clone();
        let persisted = self
            .persist(move |highlights| {
                highlights.insert(stored.id.clone(), stored);
                true
            })
            .await;
        if !persisted {
            tracing::warn!("Highlight {} rendered but not saved", id);
        }

        Some(record)
    }

    /// Apply an inbound command; returns whether the page changed
    pub async fn handle_command(&mut self, command: Command) -> bool {
        if !self.context.is_valid() {
            return false;
        }

        let config = Arc::clone(&self.highlighter.config);
        let mutator = HighlightMutator::new(&config.highlight);
        match command {
            Command::RemoveHighlight { highlight_id } => {
                mutator.remove(&mut self.document, &highlight_id) > 0
            }
            Command::RemoveAllHighlights => mutator.remove_all(&mut self.document) > 0,
            Command::UpdateHighlight {
                highlight_id,
                new_text,
            } => self.update_highlight(&highlight_id, &new_text).await,
        }
    }

    async fn update_highlight(&mut self, id: &str, new_text: &str) -> bool {
        if new_text.trim().is_empty() {
            tracing::warn!("Refusing to set empty text on highlight {}", id);
            return false;
        }

        let config = Arc::clone(&self.highlighter.config);
        if let Err(e) =
            HighlightMutator::new(&config.highlight).update_text(&mut self.document, id, new_text)
        {
            tracing::debug!("Cannot update highlight: {}", e);
            return false;
        }

        let persisted = self
            .persist(|highlights| match highlights.get_mut(id) {
                Some(record) => {
                    record.edit_text(new_text);
                    true
                }
                None => false,
            })
            .await;
        if !persisted {
            tracing::debug!("Edit of highlight {} not saved", id);
        }
        true
    }

    /// Load the map, apply `change` and write it back
    ///
    /// Aborts without writing if the context is invalidated before the
    /// write, or if `change` reports nothing to save.
    async fn persist<F>(&self, change: F) -> bool
    where
        F: FnOnce(&mut HighlightMap) -> bool,
    {
        if !self.context.is_valid() {
            return false;
        }

        let mut highlights = match self.highlighter.store.get().await {
            Ok(highlights) => highlights,
            Err(e) => {
                tracing::warn!("Failed to load highlights: {}", e);
                return false;
            }
        };

        if !self.context.is_valid() {
            tracing::debug!("Context invalidated, dropping write");
            return false;
        }
        if !change(&mut highlights) {
            return false;
        }

        match self.highlighter.store.set(highlights).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to save highlights: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Boundary, NodeId};
    use crate::store::{MemoryStore, StoreError};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    const URL: &str = "https://a.com/article?utm_source=feed#intro";
    const NORMALIZED: &str = "https://a.com/article";

    fn highlighter(store: Arc<dyn HighlightStore>) -> Highlighter {
        Highlighter::new(store, HighlighterConfig::default())
    }

    fn nth_tag(doc: &Document, tag: &str, n: usize) -> NodeId {
        doc.descendants(doc.root())
            .filter(|&id| doc.tag_name(id) == Some(tag))
            .nth(n)
            .unwrap()
    }

    fn session(store: Arc<dyn HighlightStore>, html: &str) -> PageSession {
        let mut context = PageContext::new();
        highlighter(store)
            .attach(&mut context, URL, Document::parse(html))
            .unwrap()
    }

    fn containers(session: &PageSession, id: &str) -> Vec<NodeId> {
        session
            .document()
            .elements_with_attr("data-highlight-id", id)
    }

    /// Store that always fails
    struct BrokenStore;

    #[async_trait]
    impl HighlightStore for BrokenStore {
        async fn get(&self) -> Result<HighlightMap, StoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "offline").into())
        }

        async fn set(&self, _highlights: HighlightMap) -> Result<(), StoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "offline").into())
        }
    }

    /// Store that tears the page down while a read is in flight
    #[derive(Default)]
    struct TearDownStore {
        inner: MemoryStore,
        context: Mutex<Option<Arc<PageContext>>>,
        writes: Mutex<usize>,
    }

    #[async_trait]
    impl HighlightStore for TearDownStore {
        async fn get(&self) -> Result<HighlightMap, StoreError> {
            if let Some(context) = self.context.lock().as_ref() {
                context.invalidate();
            }
            self.inner.get().await
        }

        async fn set(&self, highlights: HighlightMap) -> Result<(), StoreError> {
            *self.writes.lock() += 1;
            self.inner.set(highlights).await
        }
    }

    #[tokio::test]
    async fn test_attach_only_once_per_context() {
        let highlighter = highlighter(Arc::new(MemoryStore::new()));
        let mut context = PageContext::new();
        assert!(highlighter
            .attach(&mut context, URL, Document::parse("<p>x</p>"))
            .is_some());
        assert!(highlighter
            .attach(&mut context, URL, Document::parse("<p>x</p>"))
            .is_none());
    }

    #[tokio::test]
    async fn test_selection_renders_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut page = session(store.clone(), "<p>Hello wide world</p>");
        let text = page.document().first_child(nth_tag(page.document(), "p", 0)).unwrap();

        let record = page
            .on_selection(&Range::within_text(text, 6, 10))
            .await
            .unwrap();

        assert_eq!(record.text, "wide");
        assert_eq!(record.url, NORMALIZED);
        assert_eq!(containers(&page, &record.id).len(), 1);
        assert_eq!(store.get().await.unwrap().get(&record.id), Some(&record));
    }

    #[tokio::test]
    async fn test_whitespace_selection_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        let mut page = session(store.clone(), "<p>a    b</p>");
        let text = page.document().first_child(nth_tag(page.document(), "p", 0)).unwrap();

        assert!(page.on_selection(&Range::within_text(text, 1, 5)).await.is_none());
        assert!(store.get().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_absorbed() {
        let mut page = session(Arc::new(BrokenStore), "<p>still shown</p>");
        let text = page.document().first_child(nth_tag(page.document(), "p", 0)).unwrap();

        let record = page
            .on_selection(&Range::within_text(text, 0, 5))
            .await
            .unwrap();
        assert_eq!(containers(&page, &record.id).len(), 1);

        let report = page.start(ReadyState::Complete).await.unwrap();
        assert!(report.restored.is_empty());
    }

    #[tokio::test]
    async fn test_invalidated_context_aborts() {
        let store = Arc::new(MemoryStore::new());
        let mut context = PageContext::new();
        let mut page = highlighter(store.clone())
            .attach(&mut context, URL, Document::parse("<p>gone soon</p>"))
            .unwrap();
        let text = page.document().first_child(nth_tag(page.document(), "p", 0)).unwrap();

        context.invalidate();
        assert!(page.on_selection(&Range::within_text(text, 0, 4)).await.is_none());
        assert!(store.get().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalidation_between_read_and_write() {
        let store = Arc::new(TearDownStore::default());
        let mut context = PageContext::new();
        let mut page = highlighter(store.clone())
            .attach(&mut context, URL, Document::parse("<p>racing</p>"))
            .unwrap();
        *store.context.lock() = Some(Arc::new(context));
        let text = page.document().first_child(nth_tag(page.document(), "p", 0)).unwrap();

        let record = page.on_selection(&Range::within_text(text, 0, 4)).await;
        assert!(record.is_some());
        assert_eq!(*store.writes.lock(), 0);
    }

    #[tokio::test]
    async fn test_restore_filters_by_page() {
        let mut highlights = HighlightMap::new();
        for (id, text, url) in [
            ("h1", "second", NORMALIZED),
            ("h2", "vanished", NORMALIZED),
            ("h3", "first", "https://other.com/"),
        ] {
            highlights.insert(
                id.to_string(),
                HighlightRecord::new(id, text, url, "/html/body/p[2]", 0),
            );
        }
        let store = Arc::new(MemoryStore::with_highlights(highlights));
        let mut page = session(store, "<p>first</p><p>second</p>");

        let report = page.start(ReadyState::Interactive).await.unwrap();
        assert_eq!(report.restored, vec!["h1"]);
        assert_eq!(report.unresolved, vec!["h2"]);
        assert!(containers(&page, "h2").is_empty());
        assert_eq!(containers(&page, "h1").len(), 1);
        assert!(containers(&page, "h3").is_empty());
    }

    #[tokio::test]
    async fn test_restore_runs_exactly_once() {
        let mut highlights = HighlightMap::new();
        highlights.insert(
            "h1".to_string(),
            HighlightRecord::new("h1", "once", NORMALIZED, "/html/body/p", 0),
        );
        let store: Arc<dyn HighlightStore> = Arc::new(MemoryStore::with_highlights(highlights));

        let mut deferred = session(store.clone(), "<p>once</p>");
        assert!(deferred.start(ReadyState::Loading).await.is_none());
        assert!(containers(&deferred, "h1").is_empty());
        assert!(deferred.document_ready().await.is_some());
        assert!(deferred.document_ready().await.is_none());
        assert_eq!(containers(&deferred, "h1").len(), 1);

        let mut immediate = session(store, "<p>once</p>");
        assert!(immediate.start(ReadyState::Complete).await.is_some());
        assert!(immediate.document_ready().await.is_none());
        assert!(immediate.start(ReadyState::Complete).await.is_none());
        assert_eq!(containers(&immediate, "h1").len(), 1);
    }

    #[tokio::test]
    async fn test_anchor_then_restore_on_reload() {
        let html = "<article><p>one</p><p>the quoted part here</p></article>";
        let store: Arc<dyn HighlightStore> = Arc::new(MemoryStore::new());
        let mut page = session(store.clone(), html);
        let text = page.document().first_child(nth_tag(page.document(), "p", 1)).unwrap();
        let record = page
            .on_selection(&Range::within_text(text, 4, 10))
            .await
            .unwrap();

        let mut reloaded = session(store, html);
        let report = reloaded.start(ReadyState::Complete).await.unwrap();
        assert_eq!(report.restored, vec![record.id.clone()]);

        let container = containers(&reloaded, &record.id)[0];
        assert_eq!(reloaded.document().text_content(container), "quoted");
    }

    #[tokio::test]
    async fn test_update_command_edits_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut page = session(store.clone(), "<p>keep the old words</p>");
        let text = page.document().first_child(nth_tag(page.document(), "p", 0)).unwrap();
        let record = page
            .on_selection(&Range::within_text(text, 9, 12))
            .await
            .unwrap();

        let applied = page
            .handle_command(Command::UpdateHighlight {
                highlight_id: record.id.clone(),
                new_text: "new".to_string(),
            })
            .await;
        assert!(applied);

        let p = nth_tag(page.document(), "p", 0);
        assert_eq!(page.document().text_content(p), "keep the new words");
        assert_eq!(containers(&page, &record.id).len(), 1);

        let saved = store.get().await.unwrap().remove(&record.id).unwrap();
        assert_eq!(saved.id, record.id);
        assert_eq!(saved.text, "new");
        assert!(saved.timestamp > record.timestamp);
    }

    #[tokio::test]
    async fn test_update_rejects_empty_text_and_unknown_ids() {
        let store = Arc::new(MemoryStore::new());
        let mut page = session(store.clone(), "<p>some text</p>");
        let text = page.document().first_child(nth_tag(page.document(), "p", 0)).unwrap();
        let record = page
            .on_selection(&Range::within_text(text, 0, 4))
            .await
            .unwrap();

        assert!(
            !page
                .handle_command(Command::UpdateHighlight {
                    highlight_id: record.id.clone(),
                    new_text: "  ".to_string(),
                })
                .await
        );
        assert!(
            !page
                .handle_command(Command::UpdateHighlight {
                    highlight_id: "missing".to_string(),
                    new_text: "x".to_string(),
                })
                .await
        );
        assert_eq!(store.get().await.unwrap()[&record.id].text, "some");
    }

    #[tokio::test]
    async fn test_two_leaf_selection_removed_together() {
        let store = Arc::new(MemoryStore::new());
        let mut page = session(store, "<p>alpha <b>beta</b> gamma</p>");
        let p = nth_tag(page.document(), "p", 0);
        let before = page.document().text_content(p);
        let alpha = page.document().children(p)[0];
        let beta = page.document().first_child(nth_tag(page.document(), "b", 0)).unwrap();

        let range = Range::new(
            Boundary::new(alpha, 2),
            Boundary::new(beta, 2),
        );
        let record = page.on_selection(&range).await.unwrap();
        assert_eq!(record.text, "pha be");
        assert_eq!(containers(&page, &record.id).len(), 2);

        assert!(
            page.handle_command(Command::RemoveHighlight {
                highlight_id: record.id.clone(),
            })
            .await
        );
        assert!(containers(&page, &record.id).is_empty());
        assert_eq!(page.document().text_content(p), before);
    }

    #[tokio::test]
    async fn test_remove_all_command() {
        let store = Arc::new(MemoryStore::new());
        let mut page = session(store.clone(), "<p>one two</p>");
        let p = nth_tag(page.document(), "p", 0);
        let text = page.document().first_child(p).unwrap();
        page.on_selection(&Range::within_text(text, 0, 3)).await.unwrap();

        assert!(page.handle_command(Command::RemoveAllHighlights).await);
        assert!(!page.handle_command(Command::RemoveAllHighlights).await);
        assert_eq!(page.document().to_html(), Document::parse("<p>one two</p>").to_html());
        assert_eq!(store.get().await.unwrap().len(), 1);
    }
}
