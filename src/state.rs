//! Application state management

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::page::Highlighter;
use crate::store::HighlightStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    highlighter: Highlighter,
    catalog: Catalog,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn HighlightStore>) -> Self {
        let highlighter = Highlighter::new(Arc::clone(&store), config.highlighter.clone());
        let catalog = Catalog::new(store);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                highlighter,
                catalog,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the page highlighter
    pub fn highlighter(&self) -> &Highlighter {
        &self.inner.highlighter
    }

    /// Get the highlight catalog
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }
}
