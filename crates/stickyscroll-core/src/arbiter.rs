#![forbid(unsafe_code)]

//! Scroll arbitration state machine.
//!
//! Consumes scroll observations and user-input signals and decides whether
//! the view is following the bottom, whether the user has scrolled away, and
//! whether a near-bottom jump was the user's doing or the host's.
//!
//! The two near-bottom cases end at the same offset but are treated
//! oppositely: a jump preceded by manual input inside the recency window is a
//! user return (respected, unlocks), anything else while scrolled away is the
//! host pulling the view down (rejected with one bounce-back write).
//!
//! A legitimately slow user action that lands just past the window is bounced
//! as well; that trade-off is inherent to the recency heuristic.

use core::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::policy::ScrollPolicy;
use crate::port::ScrollPort;
use crate::state::ArbiterState;
use crate::surface::ScrollSurface;

/// What the arbiter concluded from one scroll observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ScrollDecision {
    /// Our own write is in flight; the event is not a signal.
    IgnoredProgrammatic,
    /// Near the bottom and following it.
    Following,
    /// Crossed the threshold away from the bottom.
    ScrolledAway,
    /// Still reading older content.
    StillAway,
    /// User returned to the bottom themselves.
    ReturnedToBottom,
    /// Host pulled the view down; the reading position was restored.
    BouncedBack { restored: f64 },
}

impl ScrollDecision {
    /// Whether the manual control should change visibility, and to what.
    #[must_use]
    pub const fn control_visibility(self) -> Option<bool> {
        match self {
            Self::ScrolledAway => Some(true),
            Self::ReturnedToBottom => Some(false),
            _ => None,
        }
    }
}

/// Owner of [`ArbiterState`].
#[derive(Debug, Clone)]
pub struct ScrollArbiter {
    state: ArbiterState,
    policy: ScrollPolicy,
}

impl ScrollArbiter {
    #[must_use]
    pub fn new(policy: ScrollPolicy) -> Self {
        Self {
            state: ArbiterState::new(),
            policy,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ArbiterState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut ArbiterState {
        &mut self.state
    }

    #[must_use]
    pub const fn policy(&self) -> &ScrollPolicy {
        &self.policy
    }

    /// Façade over `surface` bound to this arbiter's state.
    pub fn port<'a, S: ScrollSurface + ?Sized>(&'a mut self, surface: &'a S) -> ScrollPort<'a, S> {
        ScrollPort::new(surface, &mut self.state)
    }

    /// Handle a scroll event fired by `surface`.
    pub fn scroll_observed<S: ScrollSurface + ?Sized>(
        &mut self,
        surface: &S,
        now: Duration,
    ) -> ScrollDecision {
        if self.state.programmatic_write_in_flight {
            return ScrollDecision::IgnoredProgrammatic;
        }

        let metrics = surface.metrics();
        let distance = metrics.distance_from_bottom();

        if distance > self.policy.scroll_away_threshold {
            self.state.remember_offset(metrics.offset);
            if self.state.scrolled_away {
                return ScrollDecision::StillAway;
            }
            self.state.scrolled_away = true;
            debug!(
                target: "stickyscroll::arbiter",
                offset = metrics.offset,
                distance,
                "user scrolled away from bottom"
            );
            return ScrollDecision::ScrolledAway;
        }

        if !self.state.scrolled_away {
            self.state.remember_offset(metrics.offset);
            return ScrollDecision::Following;
        }

        if self
            .state
            .interaction_is_recent(now, self.policy.recent_interaction_window)
        {
            self.state.scrolled_away = false;
            self.state.remember_offset(metrics.offset);
            debug!(
                target: "stickyscroll::arbiter",
                offset = metrics.offset,
                "user returned to bottom"
            );
            return ScrollDecision::ReturnedToBottom;
        }

        // The bottom offset is not a reading position; keep the remembered one.
        let restored = self.state.last_known_offset;
        self.port(surface).write_bypass(restored);
        debug!(
            target: "stickyscroll::arbiter",
            pulled_to = metrics.offset,
            restored,
            "host pulled view to bottom; bounced back"
        );
        ScrollDecision::BouncedBack { restored }
    }

    /// Record manual input. Any fresh input revokes a held send-intent lock.
    pub fn user_interaction(&mut self, now: Duration) {
        self.state.last_user_interaction_at = Some(now);
        if self.state.intent_lock {
            self.state.intent_lock = false;
            debug!(target: "stickyscroll::arbiter", "manual input released intent lock");
        }
    }

    /// Enter the manual jump window: unlocks and raises the programmatic flag.
    pub fn begin_manual_jump(&mut self) {
        self.state.intent_lock = false;
        self.state.programmatic_write_in_flight = true;
    }

    /// Leave the manual jump window: the view is at the bottom again.
    pub fn finish_manual_jump(&mut self) {
        self.state.programmatic_write_in_flight = false;
        self.state.scrolled_away = false;
    }

    /// Drop the manual jump window without reaching the bottom.
    pub fn abort_manual_jump(&mut self) {
        self.state.programmatic_write_in_flight = false;
    }

    /// Hold a send-intent lock. Returns `false` when there is nothing to
    /// protect (following the bottom).
    pub fn lock_intent(&mut self) -> bool {
        if !self.state.scrolled_away {
            return false;
        }
        self.state.intent_lock = true;
        true
    }
}
