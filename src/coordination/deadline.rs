//! Absolute deadlines.
//!
//! A `Deadline` is fixed at creation ("now + budget") and never extended.
//! Downstream stages that need their own budget create a new one.

use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, Sleep};

/// Fallback horizon for budgets too large to add to `Instant::now()`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// An absolute point in time bounding one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// Deadline `budget` from now. A zero budget is already elapsed.
    pub fn after(budget: Duration) -> Self {
        let now = Instant::now();
        let at = now
            .checked_add(budget)
            .unwrap_or_else(|| now + FAR_FUTURE);
        Self { at, budget }
    }

    /// Deadline `ms` milliseconds from now.
    pub fn after_millis(ms: u64) -> Self {
        Self::after(Duration::from_millis(ms))
    }

    /// The instant at which this deadline fires.
    pub fn instant(&self) -> Instant {
        self.at
    }

    /// The budget this deadline was created with.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time left before the deadline, zero once elapsed.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_elapsed(&self) -> bool {
        Instant::now() >= self.at
    }

    /// A timer that completes when the deadline fires.
    pub fn sleep(&self) -> Sleep {
        tokio::time::sleep_until(self.at)
    }

    /// Drive `fut` until it completes or the deadline fires.
    ///
    /// Returns `None` on expiry; the future is dropped at that point.
    pub async fn within<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::time::timeout_at(self.at, fut).await.ok()
    }
}
