//! Inbound commands from the management side to a page

use serde::{Deserialize, Serialize};

/// A fire-and-forget instruction for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    RemoveHighlight { highlight_id: String },
    RemoveAllHighlights,
    #[serde(rename_all = "camelCase")]
    UpdateHighlight {
        highlight_id: String,
        new_text: String,
    },
}
