//! Export file format
//!
//! ```text
//! {
//!   "exportedAt": "2024-05-01T12:00:00.000Z",
//!   "version": 1,
//!   "links": [ { "id", "url", "title", "note", "tags", "createdAt", "updatedAt" } ]
//! }
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::sort_newest_first;
use crate::models::Link;

/// Version written into every export file
pub const EXPORT_VERSION: u32 = 1;

/// The document written by an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// RFC 3339 timestamp of the export
    pub exported_at: String,
    pub version: u32,
    pub links: Vec<Link>,
}

/// Snapshot a collection for export, newest first
pub fn export_document(links: &[Link], now: DateTime<Utc>) -> ExportDocument {
    let mut links = links.to_vec();
    sort_newest_first(&mut links);
    ExportDocument {
        exported_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        version: EXPORT_VERSION,
        links,
    }
}

/// Render an export document as pretty-printed JSON
pub fn to_json(doc: &ExportDocument) -> serde_json::Result<String> {
    serde_json::to_string_pretty(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinkInput;
    use crate::normalize::build_new_link;

    #[test]
    fn test_export_document_envelope() {
        let now = DateTime::from_timestamp_millis(1_714_564_800_000).unwrap();
        let doc = export_document(&[], now);
        assert_eq!(doc.version, 1);
        assert_eq!(doc.exported_at, "2024-05-01T12:00:00.000Z");
        assert!(doc.links.is_empty());
    }

    #[test]
    fn test_export_orders_newest_first() {
        let old = build_new_link(
            &LinkInput::from_url("old.com"),
            DateTime::from_timestamp_millis(1_000).unwrap(),
        );
        let new = build_new_link(
            &LinkInput::from_url("new.com"),
            DateTime::from_timestamp_millis(2_000).unwrap(),
        );

        let doc = export_document(&[old, new], Utc::now());
        assert_eq!(doc.links[0].url, "https://new.com");
        assert_eq!(doc.links[1].url, "https://old.com");
    }

    #[test]
    fn test_to_json_field_names() {
        let link = build_new_link(
            &LinkInput {
                url: "a.com".to_string(),
                title: "A".to_string(),
                note: "note".to_string(),
                tags: "x, y".to_string(),
            },
            Utc::now(),
        );
        let json = to_json(&export_document(&[link.clone()], Utc::now())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["exportedAt"].is_string());
        assert_eq!(value["version"], 1);
        let exported = &value["links"][0];
        assert_eq!(exported["id"], link.id.as_str());
        assert_eq!(exported["url"], "https://a.com");
        assert_eq!(exported["tags"], serde_json::json!(["x", "y"]));
        assert_eq!(exported["createdAt"], link.created_at.timestamp_millis());
    }
}
