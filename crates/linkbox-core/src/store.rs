//! Record store
//!
//! The `RecordStore` is the asynchronous persistence interface for link
//! records, backed by a single SQLite table.
//!
//! ## Connection lifecycle
//!
//! Nothing is opened when the store is constructed. The first operation
//! opens the database (creating the data directory and schema if needed)
//! and the connection is kept for the lifetime of the store. Concurrent
//! first callers all await the same open. A failed open is not remembered,
//! so the next operation tries again.
//!
//! ## Usage
//!
//! ```ignore
//! let store = RecordStore::open(&config);
//!
//! store.add(&link).await?;
//! let links = store.get_all().await?;
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tokio::sync::OnceCell;
use tokio::task;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{Link, LinkId};
use crate::storage::schema::{init_schema, needs_init};
use crate::storage::{StorageResult, StoreError};

const SELECT_LINKS: &str =
    "SELECT id, url, title, note, tags, created_at, updated_at FROM links";

const INSERT_LINK: &str = r#"
    INSERT INTO links (id, url, title, note, tags, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

const UPSERT_LINK: &str = r#"
    INSERT INTO links (id, url, title, note, tags, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    ON CONFLICT(id) DO UPDATE SET
        url = excluded.url,
        title = excluded.title,
        note = excluded.note,
        tags = excluded.tags,
        created_at = excluded.created_at,
        updated_at = excluded.updated_at
"#;

/// Where the database lives
#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

impl Location {
    fn path(&self) -> PathBuf {
        match self {
            Location::File(path) => path.clone(),
            Location::Memory => PathBuf::from(":memory:"),
        }
    }
}

/// Asynchronous store of link records keyed by id
pub struct RecordStore {
    location: Location,
    conn: OnceCell<Arc<Mutex<Connection>>>,
}

impl RecordStore {
    /// Store backed by the database file named in `config`
    pub fn open(config: &Config) -> Self {
        Self::at_path(config.sqlite_path())
    }

    /// Store backed by the database file at `path`
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
            conn: OnceCell::new(),
        }
    }

    /// Store backed by a private in-memory database (for testing)
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            conn: OnceCell::new(),
        }
    }

    /// Path of the backing database (`:memory:` for in-memory stores)
    pub fn path(&self) -> PathBuf {
        self.location.path()
    }

    // ==================== Operations ====================

    /// Get every stored link, in no particular order
    pub async fn get_all(&self) -> StorageResult<Vec<Link>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(SELECT_LINKS)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(LinkRow {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        title: row.get(2)?,
                        note: row.get(3)?,
                        tags: row.get(4)?,
                        created_at: row.get(5)?,
                        updated_at: row.get(6)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter().map(hydrate_link).collect()
        })
        .await
    }

    /// Insert a new link
    ///
    /// Fails with [`StoreError::DuplicateKey`] if the id is already taken.
    pub async fn add(&self, link: &Link) -> StorageResult<()> {
        let link = link.clone();
        self.with_conn(move |conn| write_link(conn, INSERT_LINK, &link))
            .await
    }

    /// Replace the link with the same id, inserting it if absent
    pub async fn update(&self, link: &Link) -> StorageResult<()> {
        let link = link.clone();
        self.with_conn(move |conn| write_link(conn, UPSERT_LINK, &link))
            .await
    }

    /// Remove a link; removing an unknown id is not an error
    pub async fn delete(&self, id: &LinkId) -> StorageResult<()> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let removed = conn.execute("DELETE FROM links WHERE id = ?", params![id.as_str()])?;
            debug!("Deleted link {} (rows affected: {})", id, removed);
            Ok(())
        })
        .await
    }

    /// Upsert a batch of links in one transaction
    ///
    /// Either every link is written or, if any write fails, none are.
    /// Returns the number of links written.
    pub async fn put_many(&self, links: &[Link]) -> StorageResult<usize> {
        let links = links.to_vec();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            for link in &links {
                write_link(&tx, UPSERT_LINK, link)?;
            }
            tx.commit()?;
            debug!("Committed batch of {} link(s)", links.len());
            Ok(links.len())
        })
        .await
    }

    /// Number of stored links
    pub async fn count(&self) -> StorageResult<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }

    // ==================== Connection handling ====================

    /// Get the shared connection, opening it on first use
    async fn connection(&self) -> StorageResult<Arc<Mutex<Connection>>> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let location = self.location.clone();
                let conn = task::spawn_blocking(move || open_connection(&location)).await??;
                Ok::<_, StoreError>(Arc::new(Mutex::new(conn)))
            })
            .await
            .inspect_err(|e| warn!("Failed to open record store: {}", e))?;

        Ok(Arc::clone(conn))
    }

    /// Run `f` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StorageResult<T> + Send + 'static,
    {
        let conn = self.connection().await?;
        task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StoreError::ConnectionPoisoned)?;
            f(&mut guard)
        })
        .await?
    }
}

/// Open the database and create the schema if it is missing
fn open_connection(location: &Location) -> StorageResult<Connection> {
    let opened = match location {
        Location::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| {
                    StoreError::CreateDirectory {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
            }
            Connection::open(path)
        }
        Location::Memory => Connection::open_in_memory(),
    };
    let open_error = |source: rusqlite::Error| StoreError::Open {
        path: location.path(),
        source,
    };

    let conn = opened.map_err(open_error)?;

    if needs_init(&conn) {
        debug!("Creating schema in {:?}", location.path());
        init_schema(&conn).map_err(open_error)?;
    }

    debug!("Opened record store at {:?}", location.path());
    Ok(conn)
}

// ==================== Row helpers ====================

struct LinkRow {
    id: String,
    url: String,
    title: String,
    note: String,
    tags: String,
    created_at: i64,
    updated_at: i64,
}

fn hydrate_link(row: LinkRow) -> StorageResult<Link> {
    let tags: Vec<String> = serde_json::from_str(&row.tags)?;

    let created_at = stored_timestamp(&row.id, row.created_at)?;
    let updated_at = stored_timestamp(&row.id, row.updated_at)?;

    Ok(Link {
        id: LinkId::from(row.id),
        url: row.url,
        title: row.title,
        note: row.note,
        tags,
        created_at,
        updated_at,
    })
}

fn stored_timestamp(id: &str, millis: i64) -> StorageResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| StoreError::InvalidTimestamp {
        id: id.to_string(),
        millis,
    })
}

fn write_link(conn: &Connection, sql: &str, link: &Link) -> StorageResult<()> {
    let tags = serde_json::to_string(&link.tags)?;
    conn.execute(
        sql,
        params![
            link.id.as_str(),
            link.url,
            link.title,
            link.note,
            tags,
            link.created_at.timestamp_millis(),
            link.updated_at.timestamp_millis(),
        ],
    )
    .map_err(|e| StoreError::from_write(e, link.id.as_str()))?;
    Ok(())
}
