#![forbid(unsafe_code)]

//! Session context: one arbiter, one tracked container, one control.
//!
//! [`StickySession`] is constructed once per page and threaded through every
//! host callback. The host owns the event plumbing (DOM listeners, mutation
//! observation, display-refresh scheduling) and forwards each event to the
//! matching method here:
//!
//! | host event                        | session method                         |
//! |-----------------------------------|----------------------------------------|
//! | nodes inserted under the body     | [`StickySession::nodes_inserted`]      |
//! | `scroll` on a tracked container   | [`StickySession::scroll_observed`]     |
//! | guarded `scrollTop` setter        | [`StickySession::host_write`]          |
//! | wheel / touch / keys / clicks     | [`StickySession::signal`]              |
//! | control clicked                   | [`StickySession::manual_jump`]         |
//! | display refresh                   | [`StickySession::frame`]               |
//! | position interval / resize        | [`StickySession::refresh_control_position`] |

use core::time::Duration;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::animator::Animation;
use crate::arbiter::{ScrollArbiter, ScrollDecision};
use crate::control::{ControlVisual, InputRect, ManualControl};
use crate::enforcer::{EnforcerSession, EnforcerTick};
use crate::input::{InteractionKind, PageSignal};
use crate::policy::ScrollPolicy;
use crate::port::{GuardInstall, WriteVerdict, install_guard};
use crate::state::ArbiterState;
use crate::surface::ScrollSurface;
use crate::tracker::ContainerTracker;

/// Page capabilities the session relies on.
pub trait PageHost {
    /// Live scroll container handle.
    type Container: ScrollSurface + Clone + PartialEq;
    /// Node reported by structural-change notifications.
    type Node;

    /// Monotonic session time.
    fn now(&self) -> Duration;

    /// Fallback lookup of the container by its structural criterion.
    fn query_container(&self) -> Option<Self::Container>;

    /// The container matching the criterion at or under an inserted node.
    fn resolve_inserted(&self, node: &Self::Node) -> Option<Self::Container>;

    /// Attach the scroll listener, replacing any previous one.
    fn attach_scroll_listener(&self, container: &Self::Container);

    /// Current viewport rectangle of the message input, if resolvable.
    fn input_rect(&self) -> Option<InputRect>;

    /// Current layout viewport height.
    fn viewport_height(&self) -> f64;

    /// Paint the manual control.
    fn render_control(&self, visual: &ControlVisual);

    /// Schedule one [`StickySession::frame`] call on the next display refresh.
    fn request_frame(&self);
}

/// Running totals for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionCounters {
    pub guards_installed: u64,
    pub dropped_host_writes: u64,
    pub bounce_backs: u64,
    pub manual_jumps: u64,
    pub enforcer_corrections: u64,
}

/// Result of a manual jump request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum JumpOutcome {
    Started { from: f64, target: f64 },
    NoContainer,
}

/// Result of a submit signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SubmitOutcome {
    /// Following the bottom; nothing to protect.
    NotScrolledAway,
    /// No live container to anchor on.
    NoContainer,
    /// Lock held and enforcement started at `locked_offset`.
    Locked { locked_offset: f64 },
}

/// Serializable view of the whole session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub state: ArbiterState,
    pub control: ControlVisual,
    pub tracking: bool,
    pub animation: Option<Animation>,
    pub enforcer: Option<EnforcerSession>,
    pub counters: SessionCounters,
}

/// Per-page arbitration context.
pub struct StickySession<H: PageHost> {
    host: H,
    arbiter: ScrollArbiter,
    tracker: ContainerTracker<H::Container>,
    control: ManualControl,
    animation: Option<Animation>,
    enforcer: Option<EnforcerSession>,
    counters: SessionCounters,
    degraded_reported: bool,
}

impl<H: PageHost> StickySession<H> {
    #[must_use]
    pub fn new(host: H, policy: ScrollPolicy) -> Self {
        Self {
            host,
            arbiter: ScrollArbiter::new(policy),
            tracker: ContainerTracker::new(),
            control: ManualControl::new(policy.control_gap),
            animation: None,
            enforcer: None,
            counters: SessionCounters::default(),
            degraded_reported: false,
        }
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub const fn state(&self) -> &ArbiterState {
        self.arbiter.state()
    }

    #[must_use]
    pub const fn policy(&self) -> &ScrollPolicy {
        self.arbiter.policy()
    }

    #[must_use]
    pub const fn control(&self) -> &ControlVisual {
        self.control.visual()
    }

    #[must_use]
    pub const fn counters(&self) -> SessionCounters {
        self.counters
    }

    #[must_use]
    pub fn current_container(&self) -> Option<&H::Container> {
        self.tracker.current()
    }

    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    #[must_use]
    pub const fn enforcer(&self) -> Option<&EnforcerSession> {
        self.enforcer.as_ref()
    }

    /// Paint the initial (hidden) control and wire a container already
    /// present at injection time.
    pub fn start(&mut self) -> Option<GuardInstall> {
        self.control.reposition(self.host.input_rect(), self.host.viewport_height());
        self.host.render_control(self.control.visual());
        let present = self.host.query_container()?;
        Some(self.container_inserted(present))
    }

    /// Structural-change notification. Returns how many containers were wired.
    pub fn nodes_inserted<I: IntoIterator<Item = H::Node>>(&mut self, nodes: I) -> usize {
        let mut wired = 0;
        for node in nodes {
            if let Some(container) = self.host.resolve_inserted(&node) {
                self.container_inserted(container);
                wired += 1;
            }
        }
        wired
    }

    /// Make `container` current, guard it once, and (re)attach its listener.
    pub fn container_inserted(&mut self, container: H::Container) -> GuardInstall {
        self.tracker.observe(container.clone());
        self.wire(&container)
    }

    fn wire(&mut self, container: &H::Container) -> GuardInstall {
        let install = install_guard(container, self.arbiter.state_mut());
        match install {
            GuardInstall::Installed { .. } => {
                self.counters.guards_installed = self.counters.guards_installed.saturating_add(1);
            }
            GuardInstall::Unsupported if !self.degraded_reported => {
                self.degraded_reported = true;
                warn!(
                    target: "stickyscroll::guard",
                    "scroll offset accessor unavailable; host writes cannot be intercepted"
                );
            }
            _ => {}
        }
        self.host.attach_scroll_listener(container);
        install
    }

    fn live_container(&mut self) -> Option<H::Container> {
        let before = self.tracker.current().cloned();
        let host = &self.host;
        let live = self.tracker.live(|| host.query_container());
        if let Some(container) = &live
            && before.as_ref() != Some(container)
        {
            self.wire(container);
        }
        live
    }

    /// Scroll event fired by `container`.
    pub fn scroll_observed(&mut self, container: &H::Container) -> ScrollDecision {
        let now = self.host.now();
        let decision = self.arbiter.scroll_observed(container, now);
        if matches!(decision, ScrollDecision::BouncedBack { .. }) {
            self.counters.bounce_backs = self.counters.bounce_backs.saturating_add(1);
        }
        if let Some(visible) = decision.control_visibility() {
            self.show_control(visible);
        }
        decision
    }

    /// Write issued by the host page through the guarded property.
    pub fn host_write(&mut self, container: &H::Container, value: f64) -> WriteVerdict {
        let verdict = self.arbiter.port(container).write(value);
        if verdict == WriteVerdict::Dropped {
            self.counters.dropped_host_writes = self.counters.dropped_host_writes.saturating_add(1);
        }
        verdict
    }

    /// Dispatch a classified page signal.
    pub fn signal(&mut self, signal: PageSignal) {
        match signal {
            PageSignal::Interaction { source } => self.user_interaction(source),
            PageSignal::Submit => {
                self.submit_detected();
            }
        }
    }

    /// Manual input of any kind.
    pub fn user_interaction(&mut self, source: InteractionKind) {
        let now = self.host.now();
        trace!(target: "stickyscroll::arbiter", ?source, "user interaction");
        self.arbiter.user_interaction(now);
    }

    /// Control activated: animate to the bottom.
    pub fn manual_jump(&mut self) -> JumpOutcome {
        self.user_interaction(InteractionKind::ControlClick);
        let Some(container) = self.live_container() else {
            debug!(target: "stickyscroll::animator", "manual jump requested without a container");
            return JumpOutcome::NoContainer;
        };
        let now = self.host.now();
        self.arbiter.begin_manual_jump();
        let from = container.offset();
        let target = container.scroll_height();
        self.animation = Some(Animation::new(
            from,
            target,
            now,
            self.arbiter.policy().manual_jump_duration,
        ));
        self.counters.manual_jumps = self.counters.manual_jumps.saturating_add(1);
        debug!(target: "stickyscroll::animator", from, target, "manual jump started");
        self.host.request_frame();
        JumpOutcome::Started { from, target }
    }

    /// Message submitted. Holds the reading position against the host's
    /// post-submit autoscroll.
    pub fn submit_detected(&mut self) -> SubmitOutcome {
        if !self.arbiter.state().scrolled_away() {
            return SubmitOutcome::NotScrolledAway;
        }
        let Some(container) = self.live_container() else {
            return SubmitOutcome::NoContainer;
        };
        let now = self.host.now();
        self.arbiter.lock_intent();
        let locked_offset = container.offset();
        let policy = *self.arbiter.policy();
        self.enforcer = Some(EnforcerSession::start(
            locked_offset,
            now,
            policy.enforcer_max_duration,
            policy.enforcer_tolerance,
        ));
        self.host.request_frame();
        SubmitOutcome::Locked { locked_offset }
    }

    /// One display-refresh step of the animation and enforcement loops.
    ///
    /// Returns `true` (and requests another frame) while either loop is active.
    pub fn frame(&mut self) -> bool {
        let now = self.host.now();
        let live = self.live_container();
        let mut keep = false;

        if let Some(animation) = self.animation {
            match &live {
                Some(container) => {
                    let step = animation.step(&mut self.arbiter.port(container), now);
                    if step.is_finished() {
                        self.animation = None;
                        self.arbiter.finish_manual_jump();
                        self.show_control(false);
                        debug!(
                            target: "stickyscroll::animator",
                            target_offset = step.value(),
                            "manual jump finished"
                        );
                    } else {
                        keep = true;
                    }
                }
                None => {
                    self.animation = None;
                    self.arbiter.abort_manual_jump();
                    debug!(
                        target: "stickyscroll::animator",
                        "container vanished; manual jump aborted"
                    );
                }
            }
        }

        if let Some(mut enforcer) = self.enforcer.take() {
            match enforcer.tick(live.as_ref(), self.arbiter.state_mut(), now) {
                EnforcerTick::Released { .. } => {}
                EnforcerTick::Corrected { .. } => {
                    self.counters.enforcer_corrections =
                        self.counters.enforcer_corrections.saturating_add(1);
                    self.enforcer = Some(enforcer);
                    keep = true;
                }
                EnforcerTick::Held => {
                    self.enforcer = Some(enforcer);
                    keep = true;
                }
            }
        }

        if keep {
            self.host.request_frame();
        }
        keep
    }

    /// Periodic / resize re-anchoring. Returns whether the control moved.
    pub fn refresh_control_position(&mut self) -> bool {
        let input = self.host.input_rect();
        if !self.control.reposition(input, self.host.viewport_height()) {
            return false;
        }
        self.host.render_control(self.control.visual());
        true
    }

    pub fn set_control_hovered(&mut self, hovered: bool) {
        if self.control.set_hovered(hovered) {
            self.host.render_control(self.control.visual());
        }
    }

    fn show_control(&mut self, visible: bool) {
        if !self.control.set_visible(visible) {
            return;
        }
        if visible {
            self.control.reposition(self.host.input_rect(), self.host.viewport_height());
        }
        self.host.render_control(self.control.visual());
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.arbiter.state().clone(),
            control: *self.control.visual(),
            tracking: self.tracker.current().is_some(),
            animation: self.animation,
            enforcer: self.enforcer,
            counters: self.counters,
        }
    }
}
