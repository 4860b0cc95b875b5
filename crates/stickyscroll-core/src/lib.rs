#![forbid(unsafe_code)]

//! `stickyscroll-core` arbitrates the scroll offset of a single chat-style
//! container between three writers: the host page's own autoscroll, the
//! user's manual input, and this engine's corrective/animated writes.
//!
//! Design goals:
//! - **Host-agnostic**: no DOM types. The embedding environment implements
//!   [`PageHost`] and [`ScrollSurface`] and forwards page events.
//! - **Deterministic time**: every timestamp comes from [`PageHost::now`].
//! - **Cooperative loops**: animation and send-intent enforcement advance one
//!   step per [`StickySession::frame`] call; nothing blocks.
//!
//! The browser binding lives in `stickyscroll-web`.

pub mod animator;
pub mod arbiter;
pub mod clock;
pub mod control;
pub mod enforcer;
pub mod input;
pub mod policy;
pub mod port;
pub mod session;
pub mod state;
pub mod surface;
pub mod tracker;

#[cfg(test)]
mod test_support;

pub use animator::{Animation, AnimationStep, ease_out_cubic};
pub use arbiter::{ScrollArbiter, ScrollDecision};
pub use clock::DeterministicClock;
pub use control::{ControlPosition, ControlVisual, InputRect, ManualControl};
pub use enforcer::{EnforcerSession, EnforcerTick, ReleaseReason};
pub use input::{ClickTarget, FocusTarget, InteractionKind, PageSignal};
pub use policy::ScrollPolicy;
pub use port::{GuardInstall, ScrollPort, WriteVerdict, install_guard};
pub use session::{
    JumpOutcome, PageHost, SessionCounters, SessionSnapshot, StickySession, SubmitOutcome,
};
pub use state::ArbiterState;
pub use surface::{AccessorMode, ScrollMetrics, ScrollSurface};
pub use tracker::{ContainerTracker, TrackOutcome};
