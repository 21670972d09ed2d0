//! Per-call context: the deadline plus the cancellation signal.

use std::future::Future;

use crate::coordination::cancel::CancelSignal;
use crate::coordination::deadline::Deadline;
use crate::coordination::outcome::{Failure, Outcome, ProviderId};

/// Everything a bounded call needs to know about when to stop.
#[derive(Debug, Clone)]
pub struct CallContext {
    deadline: Deadline,
    cancel: CancelSignal,
}

impl CallContext {
    pub fn new(deadline: Deadline, cancel: CancelSignal) -> Self {
        Self { deadline, cancel }
    }

    /// Context bounded only by a deadline.
    pub fn with_deadline(deadline: Deadline) -> Self {
        Self::new(deadline, CancelSignal::never())
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    /// Checkpoint: true once the deadline elapsed or cancellation arrived.
    pub fn is_done(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_elapsed()
    }

    /// Resolves at the deadline or on cancellation, whichever comes first.
    pub async fn done(&self) {
        let mut cancel = self.cancel.clone();
        tokio::select! {
            _ = self.deadline.sleep() => {}
            _ = cancel.cancelled() => {}
        }
    }

    /// Drive a provider future, abandoning it at the deadline or on cancellation.
    ///
    /// A completed result wins over a simultaneous deadline.
    pub async fn bound<T, F>(&self, provider: ProviderId, fut: F) -> Outcome<T>
    where
        F: Future<Output = Outcome<T>>,
    {
        if self.is_done() {
            return Outcome::Failure(self.expired(provider));
        }
        let mut cancel = self.cancel.clone();
        tokio::select! {
            biased;
            outcome = fut => outcome,
            _ = self.deadline.sleep() => Outcome::Failure(self.expired(provider)),
            _ = cancel.cancelled() => Outcome::Failure(self.expired(provider)),
        }
    }

    /// Timeout failure describing why this context ended.
    pub fn expired(&self, provider: ProviderId) -> Failure {
        let detail = if self.cancel.is_cancelled() {
            "cancelled"
        } else {
            "deadline elapsed"
        };
        Failure::timeout(detail).from_provider(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::cancel::cancel_pair;
    use crate::coordination::outcome::ErrorKind;
    use std::time::Duration;

    const P: ProviderId = ProviderId("test");

    #[tokio::test]
    async fn test_bound_times_out_slow_future() {
        let ctx = CallContext::with_deadline(Deadline::after_millis(20));
        let outcome: Outcome<()> = ctx
            .bound(P, async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Outcome::Success(())
            })
            .await;
        let failure = outcome.failure().cloned().expect("should time out");
        assert_eq!(failure.kind(), &ErrorKind::Timeout);
        assert_eq!(failure.provider(), Some(P));
        assert_eq!(failure.detail(), "deadline elapsed");
    }

    #[tokio::test]
    async fn test_bound_stops_on_cancel() {
        let (handle, signal) = cancel_pair();
        let ctx = CallContext::new(Deadline::after_millis(5_000), signal);
        let started = std::time::Instant::now();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });

        let outcome: Outcome<()> = ctx
            .bound(P, async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Outcome::Success(())
            })
            .await;
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(outcome.failure().map(Failure::detail), Some("cancelled"));
    }

    #[tokio::test]
    async fn test_bound_skips_work_when_already_done() {
        let polled = std::sync::atomic::AtomicBool::new(false);
        let ctx = CallContext::with_deadline(Deadline::after(Duration::ZERO));
        let outcome = ctx
            .bound(P, async {
                polled.store(true, std::sync::atomic::Ordering::SeqCst);
                Outcome::Success(())
            })
            .await;
        assert!(matches!(outcome, Outcome::Failure(_)));
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
    }
}
