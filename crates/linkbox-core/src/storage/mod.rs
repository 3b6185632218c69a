//! Storage layer
//!
//! Schema management and typed errors for the SQLite-backed record store.
//! The store itself lives in [`crate::store`].

pub mod error;
pub mod schema;

pub use error::{StorageResult, StoreError};
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
