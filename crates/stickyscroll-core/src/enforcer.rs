//! Send-intent enforcement.
//!
//! After the user submits a message while reading older content, the host
//! typically re-asserts its own autoscroll over several frames. A single
//! corrective write is not enough, so the enforcer holds the captured offset
//! with one bounded correction per frame until the lock is released by fresh
//! manual input or the failsafe deadline passes.

use core::time::Duration;

use serde::Serialize;
use tracing::{debug, trace};

use crate::port::{ScrollPort, install_guard};
use crate::state::ArbiterState;
use crate::surface::ScrollSurface;

/// Why an enforcement session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseReason {
    /// The intent lock was cleared (fresh manual input or a manual jump).
    LockCleared,
    /// The deadline passed; the lock was cleared by the enforcer.
    Expired,
}

/// Result of one enforcement frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EnforcerTick {
    /// Within tolerance (or no live container); nothing written.
    Held,
    /// Drift exceeded tolerance; offset restored.
    Corrected { drifted_to: f64 },
    /// Session over; do not tick again.
    Released { reason: ReleaseReason },
}

/// Loop-local state of one enforcement run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnforcerSession {
    locked_offset: f64,
    deadline: Duration,
    tolerance: f64,
    corrections: u32,
}

impl EnforcerSession {
    /// Anchor at `locked_offset` until `now + max_duration`.
    #[must_use]
    pub fn start(
        locked_offset: f64,
        now: Duration,
        max_duration: Duration,
        tolerance: f64,
    ) -> Self {
        debug!(
            target: "stickyscroll::enforcer",
            locked_offset,
            max_ms = max_duration.as_millis() as u64,
            "send-intent enforcement started"
        );
        Self {
            locked_offset,
            deadline: now.saturating_add(max_duration),
            tolerance,
            corrections: 0,
        }
    }

    #[must_use]
    pub const fn locked_offset(&self) -> f64 {
        self.locked_offset
    }

    #[must_use]
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }

    #[must_use]
    pub const fn corrections(&self) -> u32 {
        self.corrections
    }

    /// Advance one frame against the live container, if any.
    ///
    /// The intent lock doubles as the cancellation token.
    pub fn tick<S: ScrollSurface + ?Sized>(
        &mut self,
        live: Option<&S>,
        state: &mut ArbiterState,
        now: Duration,
    ) -> EnforcerTick {
        if !state.intent_lock {
            debug!(
                target: "stickyscroll::enforcer",
                corrections = self.corrections,
                "enforcement cancelled: lock cleared"
            );
            return EnforcerTick::Released {
                reason: ReleaseReason::LockCleared,
            };
        }
        if now > self.deadline {
            state.intent_lock = false;
            debug!(
                target: "stickyscroll::enforcer",
                corrections = self.corrections,
                "enforcement expired; lock released"
            );
            return EnforcerTick::Released {
                reason: ReleaseReason::Expired,
            };
        }
        let Some(surface) = live else {
            return EnforcerTick::Held;
        };

        // The host may have swapped the container since the last frame.
        install_guard(surface, state);

        let mut port = ScrollPort::new(surface, state);
        let current = port.read();
        if (current - self.locked_offset).abs() <= self.tolerance {
            return EnforcerTick::Held;
        }
        port.write_bypass(self.locked_offset);
        self.corrections = self.corrections.saturating_add(1);
        trace!(
            target: "stickyscroll::enforcer",
            drifted_to = current,
            locked_offset = self.locked_offset,
            "corrected drift"
        );
        EnforcerTick::Corrected {
            drifted_to: current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeSurface;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn locked_state() -> ArbiterState {
        let mut state = ArbiterState::new();
        state.scrolled_away = true;
        state.intent_lock = true;
        state
    }

    #[test]
    fn small_drift_is_tolerated() {
        let surface = FakeSurface::new(3000.0, 500.0);
        surface.set_offset(608.0);
        let mut state = locked_state();
        let mut session = EnforcerSession::start(600.0, ms(0), ms(4000), 10.0);
        assert_eq!(session.tick(Some(&surface), &mut state, ms(16)), EnforcerTick::Held);
        assert!(surface.raw_writes().is_empty());
    }

    #[test]
    fn large_drift_is_corrected() {
        let surface = FakeSurface::new(3000.0, 500.0);
        surface.set_offset(2500.0);
        let mut state = locked_state();
        let mut session = EnforcerSession::start(600.0, ms(0), ms(4000), 10.0);
        assert_eq!(
            session.tick(Some(&surface), &mut state, ms(16)),
            EnforcerTick::Corrected { drifted_to: 2500.0 }
        );
        assert_eq!(surface.offset(), 600.0);
        assert_eq!(session.corrections(), 1);
        assert!(!state.programmatic_write_in_flight());
    }

    #[test]
    fn cleared_lock_cancels() {
        let surface = FakeSurface::new(3000.0, 500.0);
        let mut state = locked_state();
        state.intent_lock = false;
        let mut session = EnforcerSession::start(600.0, ms(0), ms(4000), 10.0);
        assert_eq!(
            session.tick(Some(&surface), &mut state, ms(16)),
            EnforcerTick::Released {
                reason: ReleaseReason::LockCleared
            }
        );
    }

    #[test]
    fn deadline_expiry_releases_lock() {
        let surface = FakeSurface::new(3000.0, 500.0);
        let mut state = locked_state();
        let mut session = EnforcerSession::start(600.0, ms(100), ms(4000), 10.0);
        assert_eq!(
            session.tick(Some(&surface), &mut state, ms(4100)),
            EnforcerTick::Corrected { drifted_to: 0.0 }
        );
        assert_eq!(
            session.tick(Some(&surface), &mut state, ms(4101)),
            EnforcerTick::Released {
                reason: ReleaseReason::Expired
            }
        );
        assert!(!state.intent_lock());
    }

    #[test]
    fn replaced_container_gets_guarded() {
        let fresh = FakeSurface::new(3000.0, 500.0);
        fresh.set_offset(600.0);
        let mut state = locked_state();
        let mut session = EnforcerSession::start(600.0, ms(0), ms(4000), 10.0);
        session.tick(Some(&fresh), &mut state, ms(16));
        assert!(fresh.is_guarded());
    }

    #[test]
    fn missing_container_holds() {
        let mut state = locked_state();
        let mut session = EnforcerSession::start(600.0, ms(0), ms(4000), 10.0);
        assert_eq!(
            session.tick(None::<&FakeSurface>, &mut state, ms(16)),
            EnforcerTick::Held
        );
        assert!(state.intent_lock());
    }
}
