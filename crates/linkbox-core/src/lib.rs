//! linkbox core library
//!
//! This crate provides the persistence and normalization layer of linkbox,
//! a local bookmark manager.
//!
//! # Architecture
//!
//! - **SQLite**: a single `links` table, opened lazily and shared by every
//!   operation of a [`RecordStore`]
//!
//! Ordering, filtering and search are done over the in-memory collection
//! returned by [`RecordStore::get_all`].
//!
//! # Quick Start
//!
//! ```text
//! let store = RecordStore::open(&Config::load()?);
//!
//! // Add a link
//! let link = build_new_link(&LinkInput::from_url("example.com"), Utc::now());
//! store.add(&link).await?;
//!
//! // Query links
//! let mut links = store.get_all().await?;
//! sort_newest_first(&mut links);
//! ```
//!
//! # Modules
//!
//! - `store`: Record store (main entry point)
//! - `models`: Link record and raw input
//! - `normalize`: Canonicalization of user input and imported JSON
//! - `import` / `export`: File exchange and the import merge policy
//! - `filter`: Ordering, tag filter, search and id lookup
//! - `storage`: Schema and storage errors
//! - `config`: Application configuration

pub mod config;
pub mod export;
pub mod filter;
pub mod import;
pub mod models;
pub mod normalize;
pub mod storage;
pub mod store;

pub use config::Config;
pub use export::{export_document, to_json, ExportDocument, EXPORT_VERSION};
pub use filter::{resolve_id, sort_newest_first, tag_counts, LinkFilter, LookupError};
pub use import::{import_links, plan_import, ImportOutcome, ImportPlan, ImportReport};
pub use models::{Link, LinkId, LinkInput};
pub use normalize::{
    build_new_link, build_updated_link, normalize_imported_records, normalize_url, parse_tags,
};
pub use storage::{StorageResult, StoreError};
pub use store::RecordStore;
