//! Arbiter flags shared by the guard, the arbiter, and both frame loops.

use core::time::Duration;

use serde::Serialize;

use crate::clock;

/// Session-wide arbitration state.
///
/// Invariants:
/// - `programmatic_write_in_flight` is only raised around a bypass write or
///   for the lifetime of a manual jump animation, and is always lowered again
///   when the write returns or the animation completes/aborts.
/// - `last_known_offset` only records offsets observed outside programmatic
///   writes and greater than zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArbiterState {
    pub(crate) scrolled_away: bool,
    pub(crate) intent_lock: bool,
    pub(crate) programmatic_write_in_flight: bool,
    pub(crate) last_known_offset: f64,
    pub(crate) last_user_interaction_at: Option<Duration>,
}

impl ArbiterState {
    /// Fresh state: at bottom, unlocked, nothing in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the user has scrolled away from the bottom.
    #[must_use]
    pub const fn scrolled_away(&self) -> bool {
        self.scrolled_away
    }

    /// Whether a send-intent lock is held.
    #[must_use]
    pub const fn intent_lock(&self) -> bool {
        self.intent_lock
    }

    /// Whether one of our own writes (or a jump animation) is in flight.
    #[must_use]
    pub const fn programmatic_write_in_flight(&self) -> bool {
        self.programmatic_write_in_flight
    }

    /// Last offset the user settled on.
    #[must_use]
    pub const fn last_known_offset(&self) -> f64 {
        self.last_known_offset
    }

    /// Timestamp of the most recent manual input, if any.
    #[must_use]
    pub const fn last_user_interaction_at(&self) -> Option<Duration> {
        self.last_user_interaction_at
    }

    /// Guard policy for host writes.
    #[must_use]
    pub const fn blocks_host_writes(&self) -> bool {
        (self.scrolled_away || self.intent_lock) && !self.programmatic_write_in_flight
    }

    /// Whether manual input happened within `window` of `now`.
    #[must_use]
    pub fn interaction_is_recent(&self, now: Duration, window: Duration) -> bool {
        clock::within(now, self.last_user_interaction_at, window)
    }

    pub(crate) fn remember_offset(&mut self, offset: f64) {
        if !self.programmatic_write_in_flight && offset > 0.0 {
            self.last_known_offset = offset;
        }
    }
}
