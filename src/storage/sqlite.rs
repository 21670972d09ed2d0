//! SQLite quote store.
//!
//! # Responsibilities
//! - Open the database and create the `cotacoes` table at startup
//! - Insert one row per persisted quote, bounded by the persist deadline
//!
//! # Design Decisions
//! - rusqlite is blocking; writes run on tokio's blocking pool
//! - `busy_timeout` is set to the time left on the deadline so a locked
//!   database cannot hold the write past its budget
//! - The deadline is checked again once the connection lock is held, so a
//!   write queued behind another request never starts late
//! - A statement already executing when the deadline fires may still land;
//!   the caller has already been told it failed

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use rusqlite::{params, Connection};
use thiserror::Error;

use crate::coordination::{Deadline, Failure, Outcome};
use crate::record::NormalizedRecord;
use crate::storage::PersistenceCall;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS cotacoes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bid TEXT NOT NULL,
    source TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

/// Errors opening or preparing the database.
#[derive(Debug, Error)]
pub enum StorageSetupError {
    #[error("failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },

    #[error("failed to create schema: {0}")]
    Schema(#[from] rusqlite::Error),
}

/// Quote store backed by a single SQLite connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self, StorageSetupError> {
        let conn = Connection::open(path).map_err(|source| StorageSetupError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Opened quote database");
        Self::init(conn)
    }

    /// In-memory database, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self, StorageSetupError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageSetupError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StorageSetupError> {
        conn.execute_batch(CREATE_TABLE)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Number of stored quotes.
    pub fn count(&self) -> Result<u64, rusqlite::Error> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM cotacoes", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Most recently stored bid, if any.
    pub fn latest_bid(&self) -> Result<Option<String>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn.prepare("SELECT bid FROM cotacoes ORDER BY id DESC LIMIT 1")?;
        let mut rows = stmt.query([])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, record: &NormalizedRecord, deadline: Deadline) -> Result<(), Failure> {
        if deadline.is_elapsed() {
            return Err(Failure::timeout("persist deadline elapsed before write"));
        }
        let quote = record
            .as_quote()
            .ok_or_else(|| Failure::storage("unsupported record: only quotes are stored"))?;

        let conn = Arc::clone(&self.conn);
        let bid = quote.bid.clone();
        let source = record.source().to_string();

        // `None` means the deadline passed while queued for the pool or the lock.
        let written = tokio::task::spawn_blocking(move || -> Result<Option<usize>, rusqlite::Error> {
            let conn = conn.lock().unwrap_or_else(PoisonError::into_inner);
            if deadline.is_elapsed() {
                return Ok(None);
            }
            conn.busy_timeout(deadline.remaining())?;
            conn.execute(
                "INSERT INTO cotacoes (bid, source) VALUES (?1, ?2)",
                params![bid, source],
            )
            .map(Some)
        })
        .await;

        match written {
            Ok(Ok(Some(_))) => Ok(()),
            Ok(Ok(None)) => {
                tracing::debug!("Persist deadline elapsed while waiting for the connection");
                Err(Failure::timeout("persist deadline elapsed before write"))
            }
            Ok(Err(e)) => Err(Failure::storage(e.to_string())),
            Err(e) => Err(Failure::storage(format!("write task failed: {}", e))),
        }
    }
}

impl PersistenceCall for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn persist<'a>(
        &'a self,
        record: &'a NormalizedRecord,
        deadline: Deadline,
    ) -> BoxFuture<'a, Outcome<()>> {
        async move { Outcome::from(self.insert(record, deadline).await) }.boxed()
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}
