//! Anchor module
//!
//! Durable, page-independent descriptions of highlighted spans:
//! - `HighlightRecord`: the persisted anchor (structural path + quoted text)
//! - `StructuralPath`: tag/position route from the root to an element
//! - `AnchorBuilder`: live selection to record, rendering immediately
//! - `AnchorResolver`: record back to a live range (path first, text scan fallback)

mod builder;
mod path;
mod record;
mod resolver;

pub use builder::AnchorBuilder;
pub use path::{PathParseError, PathStep, StructuralPath};
pub use record::{generate_highlight_id, now_millis, HighlightMap, HighlightRecord};
pub use resolver::{AnchorResolver, Resolution, ResolvePhase};
