//! Persistence gateway
//!
//! The highlight collection is a single map from highlight ID to record.
//! Callers always read the whole map, change one entry and write the whole
//! map back; backends only guarantee that each `get`/`set` is atomic.
//!
//! Backends:
//! - `MemoryStore`: process-local map
//! - `JsonFileStore`: `{"highlights": {...}}` document on disk
//! - `SqliteStore`: one `highlights` table via sqlx

mod json_file;
mod memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::anchor::HighlightMap;
use crate::config::{StorageBackend, StorageConfig};

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::{create_pool, SqliteStore};

/// Storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Async access to the persisted highlight map
#[async_trait]
pub trait HighlightStore: Send + Sync {
    /// Load the full map
    async fn get(&self) -> Result<HighlightMap, StoreError>;

    /// Replace the full map
    async fn set(&self, highlights: HighlightMap) -> Result<(), StoreError>;
}

/// Open the backend selected by configuration
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn HighlightStore>, StoreError> {
    let store: Arc<dyn HighlightStore> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Json => Arc::new(JsonFileStore::new(&config.path)),
        StorageBackend::Sqlite => {
            let pool = create_pool(&config.database_url).await?;
            Arc::new(SqliteStore::new(pool))
        }
    };
    Ok(store)
}
