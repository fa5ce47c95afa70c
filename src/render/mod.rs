//! Highlight rendering module
//!
//! Turns ranges into tagged containers and takes them apart again.

mod mutator;
mod renderer;

pub use mutator::{HighlightMutator, MutateError};
pub use renderer::{HighlightConfig, HighlightRenderer};
