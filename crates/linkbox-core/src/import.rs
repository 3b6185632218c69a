//! Import merge policy
//!
//! Imported records are matched against the local collection by their
//! normalized URL, compared literally. Records whose URL already exists are
//! skipped, never merged into or overwritten; the rest are written with a
//! single batch upsert.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::models::{Link, LinkId};
use crate::normalize::normalize_imported_records;
use crate::storage::StorageResult;
use crate::store::RecordStore;

/// How an import ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// New links were written
    ///
    /// `already_saved` records matched a local URL; `duplicate_in_file`
    /// repeated a URL seen earlier in the same file.
    Imported {
        already_saved: usize,
        duplicate_in_file: usize,
    },
    /// The file parsed but held no record with a usable URL
    NoValidLinks,
    /// Every valid record's URL is already in the collection
    AllAlreadyExist,
    /// The file is not valid JSON
    InvalidJson(String),
}

/// Result of [`import_links`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    pub outcome: ImportOutcome,
}

/// The links an import would write, decided without touching storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPlan {
    pub to_insert: Vec<Link>,
    pub outcome: ImportOutcome,
}

/// Decide what importing `bytes` into `existing` would write
pub fn plan_import(bytes: &[u8], existing: &[Link], now: DateTime<Utc>) -> ImportPlan {
    let raw: Value = match serde_json::from_slice(bytes) {
        Ok(raw) => raw,
        Err(e) => {
            return ImportPlan {
                to_insert: Vec::new(),
                outcome: ImportOutcome::InvalidJson(e.to_string()),
            }
        }
    };

    let candidates = normalize_imported_records(&raw, now);
    if candidates.is_empty() {
        return ImportPlan {
            to_insert: Vec::new(),
            outcome: ImportOutcome::NoValidLinks,
        };
    }

    let total = candidates.len();
    let local_urls: HashSet<&str> = existing.iter().map(|l| l.url.as_str()).collect();
    let already_saved = candidates
        .iter()
        .filter(|l| local_urls.contains(l.url.as_str()))
        .count();

    let to_insert = select_new_links(candidates, existing);
    let outcome = if to_insert.is_empty() {
        ImportOutcome::AllAlreadyExist
    } else {
        ImportOutcome::Imported {
            already_saved,
            duplicate_in_file: total - to_insert.len() - already_saved,
        }
    };

    ImportPlan { to_insert, outcome }
}

/// Keep candidates whose URL is new, first occurrence winning
///
/// A kept candidate whose id is already taken gets a fresh id, so the batch
/// upsert can never replace an existing record.
pub fn select_new_links(candidates: Vec<Link>, existing: &[Link]) -> Vec<Link> {
    let mut seen_urls: HashSet<String> = existing.iter().map(|l| l.url.clone()).collect();
    let mut taken_ids: HashSet<LinkId> = existing.iter().map(|l| l.id.clone()).collect();

    candidates
        .into_iter()
        .filter(|link| seen_urls.insert(link.url.clone()))
        .map(|mut link| {
            if !taken_ids.insert(link.id.clone()) {
                debug!("Imported id {} already in use, assigning a new one", link.id);
                link.id = LinkId::generate();
                taken_ids.insert(link.id.clone());
            }
            link
        })
        .collect()
}

/// Import the contents of an export file into the store
///
/// `existing` is the caller's current view of the collection. Storage
/// failures are returned as errors; every other result is an outcome.
pub async fn import_links(
    store: &RecordStore,
    bytes: &[u8],
    existing: &[Link],
    now: DateTime<Utc>,
) -> StorageResult<ImportReport> {
    let plan = plan_import(bytes, existing, now);

    let inserted = if plan.to_insert.is_empty() {
        0
    } else {
        store.put_many(&plan.to_insert).await?
    };

    info!("Import finished: inserted={}, outcome={:?}", inserted, plan.outcome);
    Ok(ImportReport {
        inserted,
        outcome: plan.outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{export_document, to_json};
    use crate::models::LinkInput;
    use crate::normalize::build_new_link;
    use serde_json::json;

    fn link(url: &str) -> Link {
        build_new_link(&LinkInput::from_url(url), Utc::now())
    }

    fn bytes(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_plan_skips_existing_urls() {
        let existing = vec![link("https://x.com")];
        let file = bytes(json!({"links": [{"url": "https://x.com"}, {"url": "https://y.com"}]}));

        let plan = plan_import(&file, &existing, Utc::now());

        assert_eq!(plan.to_insert.len(), 1);
        assert_eq!(plan.to_insert[0].url, "https://y.com");
        assert_eq!(
            plan.outcome,
            ImportOutcome::Imported {
                already_saved: 1,
                duplicate_in_file: 0
            }
        );
    }

    #[test]
    fn test_plan_counts_repeats_within_file_separately() {
        let file = bytes(json!([{"url": "a.com"}, {"url": "a.com"}]));

        let plan = plan_import(&file, &[], Utc::now());

        assert_eq!(plan.to_insert.len(), 1);
        assert_eq!(
            plan.outcome,
            ImportOutcome::Imported {
                already_saved: 0,
                duplicate_in_file: 1
            }
        );

        let existing = vec![link("b.com")];
        let file = bytes(json!([{"url": "a.com"}, {"url": "b.com"}, {"url": "a.com"}]));
        let plan = plan_import(&file, &existing, Utc::now());
        assert_eq!(
            plan.outcome,
            ImportOutcome::Imported {
                already_saved: 1,
                duplicate_in_file: 1
            }
        );
    }

    #[test]
    fn test_plan_matches_on_normalized_url() {
        let existing = vec![link("x.com")];
        let file = bytes(json!([{"url": "  x.com "}]));

        let plan = plan_import(&file, &existing, Utc::now());
        assert_eq!(plan.outcome, ImportOutcome::AllAlreadyExist);
    }

    #[test]
    fn test_plan_literal_url_match_only() {
        let existing = vec![link("https://x.com")];
        let file = bytes(json!([{"url": "https://x.com/"}, {"url": "http://x.com"}]));

        let plan = plan_import(&file, &existing, Utc::now());
        assert_eq!(plan.to_insert.len(), 2);
    }

    #[test]
    fn test_plan_distinguishes_empty_outcomes() {
        let existing = vec![link("https://x.com")];

        let empty = plan_import(&bytes(json!({"links": []})), &existing, Utc::now());
        assert_eq!(empty.outcome, ImportOutcome::NoValidLinks);

        let invalid = plan_import(&bytes(json!([{"title": "no url"}])), &existing, Utc::now());
        assert_eq!(invalid.outcome, ImportOutcome::NoValidLinks);

        let dupes = plan_import(&bytes(json!([{"url": "https://x.com"}])), &existing, Utc::now());
        assert_eq!(dupes.outcome, ImportOutcome::AllAlreadyExist);

        assert_ne!(empty.outcome, dupes.outcome);
    }

    #[test]
    fn test_plan_invalid_json() {
        let plan = plan_import(b"{not json", &[], Utc::now());
        assert!(matches!(plan.outcome, ImportOutcome::InvalidJson(_)));
        assert!(plan.to_insert.is_empty());
    }

    #[test]
    fn test_select_dedups_within_file() {
        let candidates = vec![link("a.com"), link("a.com"), link("b.com")];
        let kept = select_new_links(candidates, &[]);
        let urls: Vec<&str> = kept.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.com", "https://b.com"]);
    }

    #[test]
    fn test_select_reassigns_colliding_ids() {
        let local = link("local.com");
        let mut incoming = link("incoming.com");
        incoming.id = local.id.clone();

        let kept = select_new_links(vec![incoming], std::slice::from_ref(&local));
        assert_eq!(kept.len(), 1);
        assert_ne!(kept[0].id, local.id);
        assert_eq!(kept[0].url, "https://incoming.com");
    }

    #[tokio::test]
    async fn test_import_inserts_only_new() {
        let store = RecordStore::in_memory();
        let local = link("https://x.com");
        store.add(&local).await.unwrap();
        let existing = store.get_all().await.unwrap();

        let file = bytes(json!({"links": [{"url": "https://x.com"}, {"url": "https://y.com"}]}));
        let report = import_links(&store, &file, &existing, Utc::now())
            .await
            .unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(
            report.outcome,
            ImportOutcome::Imported {
                already_saved: 1,
                duplicate_in_file: 0
            }
        );

        let links = store.get_all().await.unwrap();
        assert_eq!(links.len(), 2);
        assert!(links.iter().any(|l| l.url == "https://y.com"));
        // The local record was not touched
        assert!(links.contains(&local));
    }

    #[tokio::test]
    async fn test_import_reports_without_writing() {
        let store = RecordStore::in_memory();
        let local = link("https://x.com");
        store.add(&local).await.unwrap();
        let existing = vec![local];

        let report = import_links(&store, br#"{"links": []}"#, &existing, Utc::now())
            .await
            .unwrap();
        assert_eq!(
            report,
            ImportReport {
                inserted: 0,
                outcome: ImportOutcome::NoValidLinks
            }
        );

        let report = import_links(&store, br#"[{"url": "https://x.com"}]"#, &existing, Utc::now())
            .await
            .unwrap();
        assert_eq!(
            report,
            ImportReport {
                inserted: 0,
                outcome: ImportOutcome::AllAlreadyExist
            }
        );

        let report = import_links(&store, b"oops", &existing, Utc::now())
            .await
            .unwrap();
        assert_eq!(report.inserted, 0);
        assert!(matches!(report.outcome, ImportOutcome::InvalidJson(_)));

        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_export_then_import_round_trip() {
        let source = RecordStore::in_memory();
        let mut a = build_new_link(
            &LinkInput {
                url: "rust-lang.org".to_string(),
                title: "Rust".to_string(),
                note: "systems language".to_string(),
                tags: "rust, programming".to_string(),
            },
            DateTime::from_timestamp_millis(1_000).unwrap(),
        );
        a.updated_at = DateTime::from_timestamp_millis(9_000).unwrap();
        let b = link("example.com");
        source.put_many(&[a, b]).await.unwrap();

        let exported = source.get_all().await.unwrap();
        let json = to_json(&export_document(&exported, Utc::now())).unwrap();

        let target = RecordStore::in_memory();
        let report = import_links(&target, json.as_bytes(), &[], Utc::now())
            .await
            .unwrap();
        assert_eq!(report.inserted, 2);
        assert_eq!(
            report.outcome,
            ImportOutcome::Imported {
                already_saved: 0,
                duplicate_in_file: 0
            }
        );

        let mut expected = exported;
        let mut imported = target.get_all().await.unwrap();
        expected.sort_by(|x, y| x.url.cmp(&y.url));
        imported.sort_by(|x, y| x.url.cmp(&y.url));
        assert_eq!(imported, expected);
    }

    #[tokio::test]
    async fn test_import_propagates_store_errors() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let store = RecordStore::at_path(blocker.join("links.db"));

        let file = bytes(json!([{"url": "a.com"}]));
        let err = import_links(&store, &file, &[], Utc::now()).await.unwrap_err();
        assert!(matches!(err, crate::storage::StoreError::CreateDirectory { .. }));
    }
}
