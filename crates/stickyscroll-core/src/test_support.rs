//! In-memory host and surface doubles for unit tests.

use core::cell::{Cell, RefCell};
use core::time::Duration;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::clock::DeterministicClock;
use crate::control::{ControlVisual, InputRect};
use crate::session::PageHost;
use crate::state::ArbiterState;
use crate::surface::{AccessorMode, ScrollSurface};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct SurfaceInner {
    offset: f64,
    scroll_height: f64,
    client_height: f64,
    connected: bool,
    guard_layers: u32,
    accessor: AccessorMode,
    raw_writes: Vec<f64>,
    programmatic_flags: Vec<bool>,
}

/// Shared-handle scroll container; clones alias the same element.
#[derive(Debug, Clone)]
pub(crate) struct FakeSurface {
    id: u64,
    inner: Rc<RefCell<SurfaceInner>>,
}

impl PartialEq for FakeSurface {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl FakeSurface {
    pub(crate) fn new(scroll_height: f64, client_height: f64) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            inner: Rc::new(RefCell::new(SurfaceInner {
                offset: 0.0,
                scroll_height,
                client_height,
                connected: true,
                guard_layers: 0,
                accessor: AccessorMode::Bypass,
                raw_writes: Vec::new(),
                programmatic_flags: Vec::new(),
            })),
        }
    }

    pub(crate) fn with_accessor(self, accessor: AccessorMode) -> Self {
        self.inner.borrow_mut().accessor = accessor;
        self
    }

    /// Native scroll (user drag, layout); not recorded as a raw write.
    pub(crate) fn set_offset(&self, offset: f64) {
        self.inner.borrow_mut().offset = offset;
    }

    pub(crate) fn disconnect(&self) {
        self.inner.borrow_mut().connected = false;
    }

    pub(crate) fn raw_writes(&self) -> Vec<f64> {
        self.inner.borrow().raw_writes.clone()
    }

    /// In-flight flag observed by each programmatic write.
    pub(crate) fn programmatic_flags(&self) -> Vec<bool> {
        self.inner.borrow().programmatic_flags.clone()
    }

    pub(crate) fn guard_layers(&self) -> u32 {
        self.inner.borrow().guard_layers
    }
}

impl ScrollSurface for FakeSurface {
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

    fn accessor_mode(&self) -> AccessorMode {
        self.inner.borrow().accessor
    }

    fn is_guarded(&self) -> bool {
        self.inner.borrow().guard_layers > 0
    }

    fn install_guard(&self) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.accessor == AccessorMode::Direct {
            return false;
        }
        inner.guard_layers += 1;
        true
    }
}

/// Inserted DOM node as the fake host sees it.
#[derive(Debug, Clone)]
pub(crate) enum FakeNode {
    Container(FakeSurface),
    Subtree(Option<FakeSurface>),
}

#[derive(Debug, Default)]
pub(crate) struct FakeHost {
    pub(crate) clock: DeterministicClock,
    pub(crate) present: Option<FakeSurface>,
    pub(crate) input: Option<InputRect>,
    pub(crate) viewport_height: f64,
    pub(crate) listener_attaches: RefCell<Vec<u64>>,
    pub(crate) rendered: RefCell<Vec<ControlVisual>>,
    pub(crate) frame_requests: Cell<u32>,
}

impl FakeHost {
    pub(crate) fn advance(&mut self, ms: u64) {
        self.clock.advance(Duration::from_millis(ms));
    }
}

impl PageHost for FakeHost {
    type Container = FakeSurface;
    type Node = FakeNode;

    fn now(&self) -> Duration {
        self.clock.now()
    }

    fn query_container(&self) -> Option<FakeSurface> {
        self.present.clone()
    }

    fn resolve_inserted(&self, node: &FakeNode) -> Option<FakeSurface> {
        match node {
            FakeNode::Container(surface) => Some(surface.clone()),
            FakeNode::Subtree(child) => child.clone(),
        }
    }

    fn attach_scroll_listener(&self, container: &FakeSurface) {
        self.listener_attaches.borrow_mut().push(container.id);
    }

    fn input_rect(&self) -> Option<InputRect> {
        self.input
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn render_control(&self, visual: &ControlVisual) {
        self.rendered.borrow_mut().push(*visual);
    }

    fn request_frame(&self) {
        self.frame_requests.set(self.frame_requests.get() + 1);
    }
}
