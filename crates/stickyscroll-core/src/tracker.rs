//! Container tracking across host re-renders.
//!
//! The host destroys and recreates the scroll container as its DOM mutates.
//! The tracker keeps the most recently inserted instance as "current" and
//! detects staleness lazily: a disconnected container is replaced by the
//! fallback query on the next access. Wiring (guard + listener) is done by the
//! session for every instance the tracker reports.

use serde::Serialize;
use tracing::debug;

use crate::surface::ScrollSurface;

/// How an observed container relates to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackOutcome {
    /// No container was tracked before.
    First,
    /// A different element replaced the current one.
    Replaced,
    /// The current element was reported again.
    Unchanged,
}

/// Holds the current live container.
#[derive(Debug, Clone)]
pub struct ContainerTracker<C> {
    current: Option<C>,
    replacements: u64,
}

impl<C> Default for ContainerTracker<C> {
    fn default() -> Self {
        Self {
            current: None,
            replacements: 0,
        }
    }
}

impl<C: ScrollSurface + Clone + PartialEq> ContainerTracker<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current container, stale or not.
    #[must_use]
    pub fn current(&self) -> Option<&C> {
        self.current.as_ref()
    }

    /// Number of times the current container was replaced by a new element.
    #[must_use]
    pub const fn replacements(&self) -> u64 {
        self.replacements
    }

    /// Record an inserted matching element as current.
    pub fn observe(&mut self, container: C) -> TrackOutcome {
        let outcome = match &self.current {
            None => TrackOutcome::First,
            Some(current) if *current == container => TrackOutcome::Unchanged,
            Some(_) => {
                self.replacements = self.replacements.saturating_add(1);
                TrackOutcome::Replaced
            }
        };
        if outcome != TrackOutcome::Unchanged {
            debug!(
                target: "stickyscroll::tracker",
                ?outcome,
                replacements = self.replacements,
                "tracking scroll container"
            );
        }
        self.current = Some(container);
        outcome
    }

    /// Current container if still attached; otherwise re-resolve via `fallback`.
    pub fn live(&mut self, fallback: impl FnOnce() -> Option<C>) -> Option<C> {
        if let Some(current) = &self.current
            && current.is_connected()
        {
            return Some(current.clone());
        }
        let resolved = fallback();
        if resolved.is_some() {
            debug!(target: "stickyscroll::tracker", "re-resolved scroll container by query");
        }
        self.current = resolved.clone();
        resolved
    }
}
