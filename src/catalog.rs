//! Management-side view over the persisted highlights
//!
//! Everything here works on the stored map only. Operations that affect a
//! rendered page return the `Command` to forward to it.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::anchor::HighlightRecord;
use crate::page::Command;
use crate::store::{HighlightStore, StoreError};

/// Separator between merged highlight texts
pub const MERGE_SEPARATOR: &str = "\n\n";

/// Catalog errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Highlight text cannot be empty")]
    EmptyText,

    #[error("Highlight not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Filters for listing highlights
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive substring of the text
    pub q: Option<String>,
    /// Hostname of the page; `all` disables the filter
    pub domain: Option<String>,
}

pub struct Catalog {
    store: Arc<dyn HighlightStore>,
}

impl Catalog {
    pub fn new(store: Arc<dyn HighlightStore>) -> Self {
        Self { store }
    }

    /// Matching records, newest first
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<HighlightRecord>, CatalogError> {
        let needle = query
            .q
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        let domain = query.domain.as_deref().filter(|d| !d.is_empty() && *d != "all");

        let mut records: Vec<HighlightRecord> = self
            .store
            .get()
            .await?
            .into_values()
            .filter(|r| {
                needle
                    .as_ref()
                    .map_or(true, |n| r.text.to_lowercase().contains(n.as_str()))
            })
            .filter(|r| domain.map_or(true, |d| r.hostname().as_deref() == Some(d)))
            .collect();

        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    /// Distinct hostnames, sorted
    pub async fn domains(&self) -> Result<Vec<String>, CatalogError> {
        let domains: BTreeSet<String> = self
            .store
            .get()
            .await?
            .values()
            .filter_map(HighlightRecord::hostname)
            .collect();
        Ok(domains.into_iter().collect())
    }

    /// Texts of `ids` in the given order, separated by a blank line
    pub async fn merge(&self, ids: &[String]) -> Result<String, CatalogError> {
        let highlights = self.store.get().await?;
        let texts = ids
            .iter()
            .map(|id| {
                highlights
                    .get(id)
                    .map(|r| r.text.as_str())
                    .ok_or_else(|| CatalogError::NotFound(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(texts.join(MERGE_SEPARATOR))
    }

    /// Replace the text of a record
    pub async fn edit(
        &self,
        id: &str,
        text: &str,
    ) -> Result<(HighlightRecord, Command), CatalogError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CatalogError::EmptyText);
        }

        let mut highlights = self.store.get().await?;
        let record = highlights
            .get_mut(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        record.edit_text(text);
        let record = record.clone();
        self.store.set(highlights).await?;

        tracing::info!("Edited highlight {}", id);
        let command = Command::UpdateHighlight {
            highlight_id: record.id.clone(),
            new_text: record.text.clone(),
        };
        Ok((record, command))
    }

    /// Delete one record
    pub async fn delete(&self, id: &str) -> Result<(HighlightRecord, Command), CatalogError> {
        let mut highlights = self.store.get().await?;
        let record = highlights
            .remove(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        self.store.set(highlights).await?;

        tracing::info!("Deleted highlight {}", id);
        let command = Command::RemoveHighlight {
            highlight_id: record.id.clone(),
        };
        Ok((record, command))
    }

    /// Delete every record; returns how many there were
    pub async fn clear(&self) -> Result<(usize, Command), CatalogError> {
        let count = self.store.get().await?.len();
        self.store.set(Default::default()).await?;
        tracing::info!("Cleared {} highlights", count);
        Ok((count, Command::RemoveAllHighlights))
    }
}
