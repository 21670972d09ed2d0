//! Durable storage backends.
//!
//! # Data Flow
//! ```text
//! pipeline persist stage (record + fresh Deadline)
//!     → PersistenceCall::persist
//!         → deadline check (fail fast, no write)
//!         → sqlite.rs (server: INSERT into cotacoes on the blocking pool)
//!         → file.rs   (client: overwrite the output file)
//! ```
//!
//! # Design Decisions
//! - One capability, swappable backends; the pipeline never sees SQL or paths
//! - Storage errors are modeled as `StorageError` outcomes, never retried

pub mod file;
pub mod sqlite;

use futures_util::future::BoxFuture;

use crate::coordination::{Deadline, Outcome};
use crate::record::NormalizedRecord;

pub use file::FileStore;
pub use sqlite::{SqliteStore, StorageSetupError};

/// Writes a normalized record durably within a deadline.
pub trait PersistenceCall: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Must check `deadline` before issuing the write.
    fn persist<'a>(
        &'a self,
        record: &'a NormalizedRecord,
        deadline: Deadline,
    ) -> BoxFuture<'a, Outcome<()>>;
}
