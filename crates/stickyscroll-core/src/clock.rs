//! Monotonic session time.

use core::time::Duration;

/// Deterministic monotonic clock controlled by the embedder.
///
/// Session time starts at zero; hosts advance it explicitly (tests) or derive
/// it from a platform instant (browser).
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// Whether `at` happened strictly less than `window` before `now`.
///
/// `None` (never happened) is never recent.
#[must_use]
pub fn within(now: Duration, at: Option<Duration>, window: Duration) -> bool {
    at.is_some_and(|at| now.saturating_sub(at) < window)
}
