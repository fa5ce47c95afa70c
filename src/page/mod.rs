//! Per-page highlighter
//!
//! Ties the core together for one loaded page:
//! - `PageContext`: explicit initialization and validity state
//! - `PageSession`: restore on load, anchor on selection, apply commands
//! - `Command`: inbound instructions from the management side
//! - `SelectionSpec`: a selection described without live node handles

mod command;
mod context;
mod selection;
mod session;

pub use command::Command;
pub use context::{ContextHandle, PageContext, ReadyState};
pub use selection::{BoundarySpec, SelectionSpec};
pub use session::{Highlighter, PageSession, RestoreReport};
