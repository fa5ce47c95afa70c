//! Persisted highlight record

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted collection, keyed by highlight ID
pub type HighlightMap = BTreeMap<String, HighlightRecord>;

/// A durable highlight anchor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightRecord {
    /// Unique identifier, fixed for the record's life
    pub id: String,
    /// Highlighted plain text
    pub text: String,
    /// Normalized page URL
    pub url: String,
    /// Last-modified time in Unix milliseconds
    pub timestamp: i64,
    /// Route from the document root to the element holding the selection start
    pub structural_path: String,
    /// Character offset within the originating container (informational)
    pub offset: usize,
    /// Character length of `text`
    pub length: usize,
}

impl HighlightRecord {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        url: impl Into<String>,
        structural_path: impl Into<String>,
        offset: usize,
    ) -> Self {
        let text = text.into();
        let length = text.chars().count();
        Self {
            id: id.into(),
            text,
            url: url.into(),
            timestamp: now_millis(),
            structural_path: structural_path.into(),
            offset,
            length,
        }
    }

    /// Replace the text and move the timestamp strictly forward
    pub fn edit_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.length = self.text.chars().count();
        self.timestamp = now_millis().max(self.timestamp + 1);
    }

    /// Host part of the record's URL
    pub fn hostname(&self) -> Option<String> {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generate a highlight ID: creation time plus a random suffix
pub fn generate_highlight_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("highlight-{}-{}", now_millis(), &random[..9])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = generate_highlight_id();
        let b = generate_highlight_id();
        assert!(a.starts_with("highlight-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_edit_moves_timestamp_forward() {
        let mut record = HighlightRecord::new("h1", "old", "https://a.com/", "/html/body/p", 0);
        record.timestamp = now_millis() + 60_000;
        let before = record.timestamp;

        record.edit_text("brand new");
        assert!(record.timestamp > before);
        assert_eq!(record.length, 9);
        assert_eq!(record.id, "h1");
    }

    #[test]
    fn test_wire_shape() {
        let record = HighlightRecord::new("h1", "héllo", "https://a.com/p", "/html/body/p[2]", 3);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["structuralPath"], "/html/body/p[2]");
        assert_eq!(json["length"], 5);
        assert_eq!(json["offset"], 3);
    }
}
