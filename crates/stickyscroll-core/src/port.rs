//! Write interceptor façade.
//!
//! Every offset access the engine performs goes through a [`ScrollPort`]:
//! - [`ScrollPort::write`] is the guarded path the host page's writes take and
//!   is silently dropped while the user is scrolled away or a send-intent lock
//!   is held;
//! - [`ScrollPort::write_bypass`] is the engine's own path. It raises the
//!   programmatic flag for exactly the duration of the raw write.

use serde::Serialize;
use tracing::{debug, trace};

use crate::state::ArbiterState;
use crate::surface::{AccessorMode, ScrollSurface};

/// Verdict for one guarded write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteVerdict {
    Applied,
    Dropped,
}

/// Outcome of one guard install attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardInstall {
    /// Guard layered onto a fresh element. `reasserted` reports whether the
    /// remembered reading position was restored on it.
    Installed { reasserted: bool },
    /// The element already carried the marker; nothing changed.
    AlreadyGuarded,
    /// The platform accessor is unavailable; the element stays unguarded.
    Unsupported,
}

/// Façade over one surface and the arbitration state.
#[derive(Debug)]
pub struct ScrollPort<'a, S: ScrollSurface + ?Sized> {
    surface: &'a S,
    state: &'a mut ArbiterState,
}

impl<'a, S: ScrollSurface + ?Sized> ScrollPort<'a, S> {
    pub fn new(surface: &'a S, state: &'a mut ArbiterState) -> Self {
        Self { surface, state }
    }

    /// Accessor read.
    #[must_use]
    pub fn read(&self) -> f64 {
        self.surface.offset()
    }

    /// Guarded write, as issued by the host page.
    pub fn write(&mut self, value: f64) -> WriteVerdict {
        if self.state.blocks_host_writes() {
            trace!(
                target: "stickyscroll::guard",
                value,
                scrolled_away = self.state.scrolled_away,
                intent_lock = self.state.intent_lock,
                "dropped host offset write"
            );
            return WriteVerdict::Dropped;
        }
        self.surface.write_raw(value);
        WriteVerdict::Applied
    }

    /// Engine write that is never rejected by the guard.
    ///
    /// The previous flag value is restored afterwards so a bypass write issued
    /// during a jump animation does not end the animation's exclusion window.
    pub fn write_bypass(&mut self, value: f64) {
        let previous = core::mem::replace(&mut self.state.programmatic_write_in_flight, true);
        trace!(
            target: "stickyscroll::guard",
            value,
            in_flight = self.state.programmatic_write_in_flight,
            "bypass offset write"
        );
        self.surface.write_programmatic(value, self.state);
        self.state.programmatic_write_in_flight = previous;
    }
}

/// Layer the guard over `surface` exactly once.
///
/// A second call on the same element is a no-op. On first install, if the
/// user is reading older content, the remembered offset is re-asserted on the
/// new element (the host replaced the container mid-read).
pub fn install_guard<S: ScrollSurface + ?Sized>(
    surface: &S,
    state: &mut ArbiterState,
) -> GuardInstall {
    if surface.is_guarded() {
        return GuardInstall::AlreadyGuarded;
    }
    if surface.accessor_mode() == AccessorMode::Direct || !surface.install_guard() {
        debug!(
            target: "stickyscroll::guard",
            "offset accessor unavailable; container left unguarded"
        );
        return GuardInstall::Unsupported;
    }

    let reasserted = state.scrolled_away && state.last_known_offset > 0.0;
    if reasserted {
        let offset = state.last_known_offset;
        ScrollPort::new(surface, state).write_bypass(offset);
    }
    debug!(target: "stickyscroll::guard", reasserted, "guard installed");
    GuardInstall::Installed { reasserted }
}
