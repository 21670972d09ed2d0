//! Staged pipeline: fetch, then persist, each under its own deadline.
//!
//! # Stages
//! ```text
//! Fetch   → Deadline::after(budgets.fetch)
//!     failure → return tagged Stage::Fetch (persist never invoked)
//! Persist → Deadline::after(budgets.persist), computed when the stage begins
//!     elapsed before start → Timeout tagged Stage::Persist, no write
//!     overrun / failure    → tagged Stage::Persist, fetched value dropped
//! ```
//!
//! # Design Decisions
//! - The persist deadline does not inherit what is left of the fetch budget
//! - A persist failure is terminal for the request
//! - Persist is attempted at most once

use std::time::{Duration, Instant};

use crate::coordination::context::CallContext;
use crate::coordination::deadline::Deadline;
use crate::coordination::outcome::{Failure, Outcome, Stage};
use crate::observability::metrics;
use crate::providers::ProviderCall;
use crate::record::NormalizedRecord;
use crate::storage::PersistenceCall;

/// Independent budgets for the two pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageBudgets {
    pub fetch: Duration,
    pub persist: Duration,
}

impl StageBudgets {
    pub fn from_millis(fetch_ms: u64, persist_ms: u64) -> Self {
        Self {
            fetch: Duration::from_millis(fetch_ms),
            persist: Duration::from_millis(persist_ms),
        }
    }
}

/// Fetch `key` from `fetch`, then write the record through `persist`.
pub async fn run(
    fetch: &dyn ProviderCall,
    persist: &dyn PersistenceCall,
    key: &str,
    budgets: StageBudgets,
) -> Outcome<NormalizedRecord> {
    let record = match fetch_stage(fetch, key, Deadline::after(budgets.fetch)).await {
        Outcome::Success(record) => record,
        Outcome::Failure(failure) => {
            tracing::warn!(provider = %fetch.id(), error = %failure, "Fetch stage failed");
            return Outcome::Failure(failure);
        }
    };

    match persist_stage(persist, &record, Deadline::after(budgets.persist)).await {
        Outcome::Success(()) => Outcome::Success(record),
        Outcome::Failure(failure) => {
            tracing::warn!(
                store = persist.name(),
                source = %record.source(),
                error = %failure,
                "Persist stage failed; fetched value discarded"
            );
            Outcome::Failure(failure)
        }
    }
}

async fn fetch_stage(
    fetch: &dyn ProviderCall,
    key: &str,
    deadline: Deadline,
) -> Outcome<NormalizedRecord> {
    let started = Instant::now();
    let ctx = CallContext::with_deadline(deadline);
    let outcome = match ctx.bound(fetch.id(), fetch.fetch(key, &ctx)).await {
        Outcome::Failure(failure) => Outcome::Failure(failure.at_stage(Stage::Fetch)),
        success => success,
    };
    metrics::record_stage(Stage::Fetch, outcome.label(), started);
    outcome
}

async fn persist_stage(
    persist: &dyn PersistenceCall,
    record: &NormalizedRecord,
    deadline: Deadline,
) -> Outcome<()> {
    let started = Instant::now();
    let outcome = if deadline.is_elapsed() {
        Outcome::Failure(Failure::timeout("persist budget elapsed before write"))
    } else {
        match deadline.within(persist.persist(record, deadline)).await {
            Some(outcome) => outcome,
            None => Outcome::Failure(Failure::timeout(format!(
                "write exceeded {}ms",
                deadline.budget().as_millis()
            ))),
        }
    };
    let outcome = match outcome {
        Outcome::Failure(failure) => Outcome::Failure(failure.at_stage(Stage::Persist)),
        success => success,
    };
    metrics::record_stage(Stage::Persist, outcome.label(), started);
    outcome
}
