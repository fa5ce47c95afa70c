//! Per-page initialization and validity state

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Explicit state for one page context
///
/// The initialization flag is set once by `Highlighter::attach`. The
/// validity flag is shared with the session so tearing the page down can be
/// observed between persistence steps.
#[derive(Debug)]
pub struct PageContext {
    initialized: bool,
    valid: Arc<AtomicBool>,
}

impl Default for PageContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PageContext {
    pub fn new() -> Self {
        Self {
            initialized: false,
            valid: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Mark the context initialized; returns false if it already was
    pub(crate) fn initialize(&mut self) -> bool {
        !std::mem::replace(&mut self.initialized, true)
    }

    /// Tear the context down
    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::SeqCst);
    }

    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }

    pub fn handle(&self) -> ContextHandle {
        ContextHandle {
            valid: Arc::clone(&self.valid),
        }
    }
}

/// Read side of a context's validity flag
#[derive(Debug, Clone)]
pub struct ContextHandle {
    valid: Arc<AtomicBool>,
}

impl ContextHandle {
    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }
}

/// Document loading state at the time a session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}
