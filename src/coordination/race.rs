//! Race coordinator: first success wins under one shared deadline.
//!
//! # Algorithm
//! ```text
//! spawn one RaceTicket per provider ── each bound to the same Deadline
//!         │ report exactly once (try_send, capacity = participants)
//!         ▼
//! coordinator: select { conduit, deadline }
//!     Success            → cancel the rest, return it
//!     Failure            → collect; all failed → AllProvidersFailed
//!                          (Timeout instead once the deadline has passed)
//!     deadline fired     → cancel everyone, Timeout
//! ```
//!
//! # Design Decisions
//! - Failures never short-circuit; only success or the deadline end a race
//! - All-failed returns as soon as the last report lands, not at the deadline
//! - The coordinator never waits for cancelled tickets

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::coordination::cancel::{cancel_pair, CancelSignal};
use crate::coordination::context::CallContext;
use crate::coordination::deadline::Deadline;
use crate::coordination::outcome::{ErrorKind, Failure, Outcome};
use crate::observability::metrics;
use crate::providers::ProviderCall;
use crate::record::NormalizedRecord;

/// One in-flight provider call inside a race.
///
/// Owns its cancellation signal and its end of the result conduit; both are
/// released when the ticket finishes, whether it won, lost, or was cancelled.
struct RaceTicket {
    provider: Arc<dyn ProviderCall>,
    ctx: CallContext,
    report: mpsc::Sender<Outcome<NormalizedRecord>>,
}

impl RaceTicket {
    async fn run(self, key: String) {
        let RaceTicket {
            provider,
            ctx,
            report,
        } = self;
        let id = provider.id();
        let started = Instant::now();

        let outcome = ctx.bound(id, provider.fetch(&key, &ctx)).await;
        metrics::record_provider_call(id, outcome.label(), started);

        match &outcome {
            Outcome::Success(_) => {
                tracing::debug!(provider = %id, elapsed_ms = started.elapsed().as_millis() as u64, "Provider answered");
            }
            Outcome::Failure(failure) => {
                tracing::debug!(provider = %id, error = %failure, "Provider failed");
            }
        }

        // Capacity equals participants, so this only fails once the race is settled.
        if report.try_send(outcome).is_err() {
            tracing::trace!(provider = %id, "Race already settled, discarding report");
        }
    }
}

/// Race `providers` for `key`; the first success before `deadline` wins.
pub async fn race(
    providers: &[Arc<dyn ProviderCall>],
    key: &str,
    deadline: Deadline,
) -> Outcome<NormalizedRecord> {
    let started = Instant::now();
    let participants = providers.len();

    if participants == 0 {
        let outcome = Outcome::Failure(Failure::new(
            ErrorKind::AllProvidersFailed(Vec::new()),
            "no providers configured",
        ));
        metrics::record_race(outcome.label(), started);
        return outcome;
    }

    let (cancel, signal) = cancel_pair();
    let (tx, mut rx) = mpsc::channel(participants);
    launch(providers, key, deadline, &signal, &tx);
    drop(tx);

    let mut failures = Vec::with_capacity(participants);
    let expiry = deadline.sleep();
    tokio::pin!(expiry);

    let outcome = loop {
        tokio::select! {
            biased;
            report = rx.recv() => match report {
                Some(Outcome::Success(record)) => break Outcome::Success(record),
                Some(Outcome::Failure(failure)) => {
                    failures.push(failure);
                    if failures.len() == participants {
                        break settle_failed(failures, deadline);
                    }
                }
                // Every ticket is gone without reporting (a provider panicked).
                None => break settle_failed(failures, deadline),
            },
            _ = &mut expiry => break timed_out(deadline),
        }
    };

    cancel.cancel();

    match &outcome {
        Outcome::Success(record) => tracing::info!(
            winner = %record.source(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Race settled"
        ),
        Outcome::Failure(failure) => tracing::warn!(
            error = %failure,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Race failed"
        ),
    }
    metrics::record_race(outcome.label(), started);

    outcome
}

fn launch(
    providers: &[Arc<dyn ProviderCall>],
    key: &str,
    deadline: Deadline,
    signal: &CancelSignal,
    tx: &mpsc::Sender<Outcome<NormalizedRecord>>,
) {
    for provider in providers {
        let ticket = RaceTicket {
            provider: Arc::clone(provider),
            ctx: CallContext::new(deadline, signal.clone()),
            report: tx.clone(),
        };
        tokio::spawn(ticket.run(key.to_owned()));
    }
}

/// Tickets time themselves out at the same instant the coordinator's timer
/// fires, so a full set of reports can land after expiry. Once the deadline
/// has passed the race is a timeout, whatever the reports say.
fn settle_failed(failures: Vec<Failure>, deadline: Deadline) -> Outcome<NormalizedRecord> {
    if deadline.is_elapsed() {
        return timed_out(deadline);
    }
    Outcome::Failure(Failure::new(ErrorKind::AllProvidersFailed(failures), ""))
}

fn timed_out(deadline: Deadline) -> Outcome<NormalizedRecord> {
    Outcome::Failure(Failure::timeout(format!(
        "no provider succeeded within {}ms",
        deadline.budget().as_millis()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::outcome::ProviderId;
    use crate::record::Quote;
    use futures_util::future::BoxFuture;
    use futures_util::FutureExt;
    use std::time::Duration;

    struct Fixed {
        id: ProviderId,
        delay: Duration,
        fail: Option<ErrorKind>,
    }

    impl ProviderCall for Fixed {
        fn id(&self) -> ProviderId {
            self.id
        }

        fn fetch<'a>(
            &'a self,
            _key: &'a str,
            _ctx: &'a CallContext,
        ) -> BoxFuture<'a, Outcome<NormalizedRecord>> {
            async move {
                tokio::time::sleep(self.delay).await;
                match &self.fail {
                    Some(kind) => Outcome::Failure(Failure::new(kind.clone(), "").from_provider(self.id)),
                    None => Outcome::Success(NormalizedRecord::quote(self.id, Quote { bid: "1.0".into() })),
                }
            }
            .boxed()
        }
    }

    fn fixed(id: &'static str, delay_ms: u64, fail: Option<ErrorKind>) -> Arc<dyn ProviderCall> {
        Arc::new(Fixed {
            id: ProviderId(id),
            delay: Duration::from_millis(delay_ms),
            fail,
        })
    }

    #[tokio::test]
    async fn test_empty_race_fails_immediately() {
        let outcome = race(&[], "k", Deadline::after_millis(1_000)).await;
        let failure = outcome.failure().cloned().unwrap();
        assert_eq!(failure.kind(), &ErrorKind::AllProvidersFailed(Vec::new()));
    }

    #[tokio::test]
    async fn test_failure_does_not_short_circuit_success() {
        let providers = vec![
            fixed("fast-fail", 5, Some(ErrorKind::Unreachable)),
            fixed("slow-ok", 40, None),
        ];
        let outcome = race(&providers, "k", Deadline::after_millis(1_000)).await;
        let record = outcome.success().expect("slow provider should still win");
        assert_eq!(record.source(), ProviderId("slow-ok"));
    }

    #[tokio::test]
    async fn test_failure_then_deadline_is_timeout() {
        let providers = vec![
            fixed("fail", 5, Some(ErrorKind::NotFound)),
            fixed("hang", 5_000, None),
        ];
        let outcome = race(&providers, "k", Deadline::after_millis(60)).await;
        assert!(outcome.failure().is_some_and(Failure::is_timeout));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reports_racing_expiry_still_time_out() {
        for _ in 0..100 {
            let providers = vec![fixed("slow", 400, None)];
            let outcome = race(&providers, "k", Deadline::after_millis(10)).await;
            let kind = outcome.failure().map(|f| f.kind().clone());
            assert_eq!(kind, Some(ErrorKind::Timeout));
        }
    }

    #[test]
    fn test_settle_after_expiry_is_timeout() {
        let late = vec![Failure::timeout("deadline elapsed").from_provider(ProviderId("slow"))];
        let outcome = settle_failed(late, Deadline::after(Duration::ZERO));
        assert_eq!(outcome.failure().map(Failure::kind), Some(&ErrorKind::Timeout));
    }

    #[tokio::test]
    async fn test_single_provider_failure_is_aggregated() {
        let providers = vec![fixed("only", 5, Some(ErrorKind::RemoteRejected(500)))];
        let outcome = race(&providers, "k", Deadline::after_millis(1_000)).await;
        let failure = outcome.failure().cloned().unwrap();
        assert_eq!(failure.sub_failures().len(), 1);
        assert_eq!(failure.sub_failures()[0].kind(), &ErrorKind::RemoteRejected(500));
    }
}
