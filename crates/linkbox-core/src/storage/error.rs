//! Storage error handling
//!
//! Provides typed errors for record store operations with descriptive
//! messages and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tokio::task::JoinError;

/// Errors that can occur during record store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database could not be opened or its schema created
    #[error("Failed to open database at '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Failed to create data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Insert collided with an existing id
    #[error("A link with id '{id}' already exists")]
    DuplicateKey { id: String },

    /// A read or write transaction failed
    #[error("Database error: {0}")]
    Transaction(#[from] rusqlite::Error),

    /// Tag column could not be encoded or decoded
    #[error("Invalid stored tags: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored timestamp is outside the representable range
    #[error("Link '{id}' has an invalid stored timestamp: {millis}")]
    InvalidTimestamp { id: String, millis: i64 },

    /// The blocking worker running the query panicked or was cancelled
    #[error("Storage worker failed: {0}")]
    Worker(#[from] JoinError),

    /// A previous operation panicked while holding the connection
    #[error("Database connection is unusable after an earlier failure")]
    ConnectionPoisoned,
}

impl StoreError {
    /// Classify a SQLite error raised while writing the record `id`
    ///
    /// Primary-key violations become [`StoreError::DuplicateKey`]; anything
    /// else is a transaction failure.
    pub fn from_write(error: rusqlite::Error, id: &str) -> Self {
        if is_primary_key_violation(&error) {
            StoreError::DuplicateKey { id: id.to_string() }
        } else {
            StoreError::Transaction(error)
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StoreError::Open { .. }
                | StoreError::CreateDirectory { .. }
                | StoreError::DuplicateKey { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::Open { .. } => Some(
                "Check that the data directory is writable and that no other process holds a lock on the database.",
            ),
            StoreError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            StoreError::DuplicateKey { .. } => Some("Retry with a freshly generated id."),
            _ => None,
        }
    }
}

fn is_primary_key_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StoreError>;
