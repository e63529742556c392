//! Deadline bookkeeping shared by every wait in the driver.
//!
//! All protocol loops measure their budget through [`Deadline`] and park
//! through [`settle`], so the waiting strategy lives in one place.

use std::time::Duration;

use tokio::time::Instant;

/// Horizon used when `now + timeout` is not representable.
const FAR_HORIZON: Duration = Duration::from_secs(86_400 * 365);

/// A point on the monotonic clock after which a wait gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// Creates a deadline `timeout` from now.
    ///
    /// An overflowing sum restarts from the current instant with a far
    /// horizon instead of expiring immediately.
    #[must_use]
    pub fn after(timeout: Duration) -> Self {
        let now = Instant::now();
        let at = now
            .checked_add(timeout)
            .or_else(|| now.checked_add(FAR_HORIZON))
            .unwrap_or(now);
        Self {
            at,
            budget: timeout,
        }
    }

    /// The instant at which the deadline expires.
    #[must_use]
    pub const fn instant(&self) -> Instant {
        self.at
    }

    /// The budget this deadline was created with.
    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    /// Time left before expiry (zero once expired).
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Returns true once the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }
}

/// Parks the caller for `duration`.
pub async fn settle(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
