//! In-memory highlight store

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{HighlightStore, StoreError};
use crate::anchor::HighlightMap;

/// Process-local store, mainly for tests and ephemeral servers
#[derive(Debug, Default)]
pub struct MemoryStore {
    highlights: RwLock<HighlightMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_highlights(highlights: HighlightMap) -> Self {
        Self {
            highlights: RwLock::new(highlights),
        }
    }
}

#[async_trait]
impl HighlightStore for MemoryStore {
    async fn get(&self) -> Result<HighlightMap, StoreError> {
        Ok(self.highlights.read().clone())
    }

    async fn set(&self, highlights: HighlightMap) -> Result<(), StoreError> {
        *self.highlights.write() = highlights;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::HighlightRecord;

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryStore::new();
        assert!(store.get().await.unwrap().is_empty());

        let mut map = HighlightMap::new();
        let record = HighlightRecord::new("h1", "text", "https://a.com/", "/html/body/p", 0);
        map.insert(record.id.clone(), record);
        store.set(map.clone()).await.unwrap();

        assert_eq!(store.get().await.unwrap(), map);
    }
}
