//! Shared page double for integration tests.
//!
//! `PageSurface` behaves like a browser scroll container without clamping.
//! Every raw write is recorded, and engine writes additionally record whether
//! the arbiter had them flagged as programmatic at the moment they landed.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use stickyscroll_core::{
    ArbiterState, ControlVisual, DeterministicClock, InputRect, PageHost, ScrollPolicy,
    ScrollSurface, StickySession,
};

#[derive(Debug)]
struct Inner {
    offset: f64,
    scroll_height: f64,
    client_height: f64,
    connected: bool,
    guard_layers: u32,
    raw_writes: Vec<f64>,
    programmatic_flags: Vec<bool>,
}

/// Shared-handle scroll container; clones alias the same element.
#[derive(Debug, Clone)]
pub struct PageSurface {
    inner: Rc<RefCell<Inner>>,
}

impl PartialEq for PageSurface {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PageSurface {
    pub fn new(scroll_height: f64, client_height: f64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                offset: 0.0,
                scroll_height,
                client_height,
                connected: true,
                guard_layers: 0,
                raw_writes: Vec::new(),
                programmatic_flags: Vec::new(),
            })),
        }
    }

    /// Offset change the engine did not cause (native scroll, layout).
    pub fn scroll_natively(&self, offset: f64) {
        self.inner.borrow_mut().offset = offset;
    }

    pub fn bottom(&self) -> f64 {
        let inner = self.inner.borrow();
        inner.scroll_height - inner.client_height
    }

    pub fn raw_writes(&self) -> Vec<f64> {
        self.inner.borrow().raw_writes.clone()
    }

    /// Programmatic flag as seen by each engine write, in write order.
    pub fn programmatic_flags(&self) -> Vec<bool> {
        self.inner.borrow().programmatic_flags.clone()
    }

    pub fn guard_layers(&self) -> u32 {
        self.inner.borrow().guard_layers
    }

    pub fn remove(&self) {
        self.inner.borrow_mut().connected = false;
    }
}

impl ScrollSurface for PageSurface {
    fn offset(&self) -> f64 {
        self.inner.borrow().offset
    }

    fn write_raw(&self, value: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.offset = value;
        inner.raw_writes.push(value);
    }

    fn write_programmatic(&self, value: f64, state: &ArbiterState) {
        self.inner
            .borrow_mut()
            .programmatic_flags
            .push(state.programmatic_write_in_flight());
        self.write_raw(value);
    }

    fn scroll_height(&self) -> f64 {
        self.inner.borrow().scroll_height
    }

    fn client_height(&self) -> f64 {
        self.inner.borrow().client_height
    }

    fn is_connected(&self) -> bool {
        self.inner.borrow().connected
    }

    fn is_guarded(&self) -> bool {
        self.inner.borrow().guard_layers > 0
    }

    fn install_guard(&self) -> bool {
        self.inner.borrow_mut().guard_layers += 1;
        true
    }
}

#[derive(Debug, Default)]
pub struct Page {
    pub clock: DeterministicClock,
    pub container: Option<PageSurface>,
    pub input: Option<InputRect>,
    pub viewport_height: f64,
    pub paints: RefCell<Vec<ControlVisual>>,
}

impl PageHost for Page {
    type Container = PageSurface;
    type Node = Option<PageSurface>;

    fn now(&self) -> Duration {
        self.clock.now()
    }

    fn query_container(&self) -> Option<PageSurface> {
        self.container.clone()
    }

    fn resolve_inserted(&self, node: &Option<PageSurface>) -> Option<PageSurface> {
        node.clone()
    }

    fn attach_scroll_listener(&self, _container: &PageSurface) {}

    fn input_rect(&self) -> Option<InputRect> {
        self.input
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn render_control(&self, visual: &ControlVisual) {
        self.paints.borrow_mut().push(*visual);
    }

    fn request_frame(&self) {}
}

pub const FRAME: Duration = Duration::from_millis(16);

/// 10_000px of chat in an 800px scroller, wired and started at t=0.
pub fn started_session() -> (StickySession<Page>, PageSurface) {
    let surface = PageSurface::new(10_000.0, 800.0);
    surface.scroll_natively(surface.bottom());
    let page = Page {
        container: Some(surface.clone()),
        input: Some(InputRect {
            left: 240.0,
            top: 900.0,
            width: 720.0,
            height: 64.0,
        }),
        viewport_height: 1000.0,
        ..Page::default()
    };
    let mut session = StickySession::new(page, ScrollPolicy::default());
    session.start();
    (session, surface)
}

pub fn advance(session: &mut StickySession<Page>, dt: Duration) {
    session.host_mut().clock.advance(dt);
}

/// User drags the view up to `offset` (interaction + scroll event).
pub fn user_scrolls_to(session: &mut StickySession<Page>, surface: &PageSurface, offset: f64) {
    session.user_interaction(stickyscroll_core::InteractionKind::Wheel);
    surface.scroll_natively(offset);
    session.scroll_observed(surface);
}
