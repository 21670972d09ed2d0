//! Plain-text quote file written by the quote client.

use std::path::{Path, PathBuf};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::coordination::{Deadline, Failure, Outcome};
use crate::record::{NormalizedRecord, Quote};
use crate::storage::PersistenceCall;

/// Overwrites a file with the latest quote (`Dólar: {bid}`).
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File contents for a quote.
    pub fn render(quote: &Quote) -> String {
        format!("Dólar: {}", quote.bid)
    }

    async fn write(&self, record: &NormalizedRecord, deadline: Deadline) -> Result<(), Failure> {
        if deadline.is_elapsed() {
            return Err(Failure::timeout("persist deadline elapsed before write"));
        }
        let quote = record
            .as_quote()
            .ok_or_else(|| Failure::storage("unsupported record: only quotes are written"))?;

        let path = self.path.clone();
        let contents = Self::render(quote);
        // Checked again on the blocking pool: a write queued past the deadline is skipped.
        let written = tokio::task::spawn_blocking(move || -> std::io::Result<bool> {
            if deadline.is_elapsed() {
                return Ok(false);
            }
            std::fs::write(&path, contents).map(|()| true)
        })
        .await;

        match written {
            Ok(Ok(true)) => {}
            Ok(Ok(false)) => return Err(Failure::timeout("persist deadline elapsed before write")),
            Ok(Err(e)) => return Err(Failure::storage(format!("{}: {}", self.path.display(), e))),
            Err(e) => return Err(Failure::storage(format!("write task failed: {}", e))),
        }

        tracing::info!(path = %self.path.display(), bid = %quote.bid, "Quote written");
        Ok(())
    }
}

impl PersistenceCall for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    fn persist<'a>(
        &'a self,
        record: &'a NormalizedRecord,
        deadline: Deadline,
    ) -> BoxFuture<'a, Outcome<()>> {
        async move { Outcome::from(self.write(record, deadline).await) }.boxed()
    }
}
