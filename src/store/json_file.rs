//! JSON file highlight store
//!
//! Keeps the collection under a `highlights` key, the same layout a browser
//! extension's local storage uses, so exported data can be loaded directly.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{HighlightStore, StoreError};
use crate::anchor::HighlightMap;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredDocument {
    #[serde(default)]
    highlights: HighlightMap,
}

/// File-backed store; writes go through a temp file and a rename
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes writers within this process
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> Result<HighlightMap, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(HighlightMap::new()),
            Ok(bytes) => {
                let stored: StoredDocument = serde_json::from_slice(&bytes)?;
                Ok(stored.highlights)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HighlightMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl HighlightStore for JsonFileStore {
    async fn get(&self) -> Result<HighlightMap, StoreError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    async fn set(&self, highlights: HighlightMap) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let bytes = serde_json::to_vec_pretty(&StoredDocument { highlights })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        tracing::debug!("Wrote highlight store to {}", self.path.display());
        Ok(())
    }
}
