//! `wasm-bindgen` entry point and DOM plumbing.
//!
//! The session lives in an `Rc<RefCell<_>>` owned by a thread-local runtime.
//! Every DOM callback holds only a `Weak` handle and borrows the session for
//! the duration of one event, so callbacks never overlap.

use std::cell::{Cell, OnceCell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use js_sys::{Function, Object, Reflect};
use stickyscroll_core::input::{classify_click, classify_keydown, classify_pointer_down};
use stickyscroll_core::{
    AccessorMode, ClickTarget, ControlVisual, FocusTarget, InputRect, InteractionKind, PageHost,
    PageSignal, ScrollPolicy, ScrollSurface, StickySession,
};
use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, HtmlElement, KeyboardEvent, MouseEvent,
    MutationObserver, MutationObserverInit, MutationRecord, Node, Window,
};
use web_time::Instant;

use crate::error::{BootError, Result};
use crate::selectors::{
    BUTTON_SELECTOR, CONTAINER_SELECTOR, CONTROL_ID, GUARD_MARKER_ATTR, ICON_PATH_MARKER,
    INPUT_SELECTORS, SEND_LABEL_SELECTOR,
};
use crate::style::{CONTROL_BASE_CSS, CONTROL_ICON_SVG, control_style};

type Session = StickySession<DomHost>;
type SharedSession = Rc<RefCell<Session>>;
type SessionHandle = Weak<RefCell<Session>>;

fn console_error(message: &str) {
    let global = js_sys::global();
    if let Ok(console) = Reflect::get(&global, &"console".into())
        && let Ok(error) = Reflect::get(&console, &"error".into())
        && let Ok(f) = error.dyn_into::<Function>()
    {
        let _ = f.call1(&console, &JsValue::from_str(message));
    }
}

fn install_panic_hook() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            console_error(&format!("[stickyscroll] {info}"));
        }));
    });
}

fn js_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

trait JsStage<T> {
    fn stage(self, stage: &'static str) -> Result<T>;
}

impl<T> JsStage<T> for std::result::Result<T, JsValue> {
    fn stage(self, stage: &'static str) -> Result<T> {
        self.map_err(|value| BootError::js(stage, js_message(&value)))
    }
}

// ---------------------------------------------------------------------------
// Offset accessor
// ---------------------------------------------------------------------------

/// The native `Element.prototype.scrollTop` accessor pair, captured before
/// any instance property shadows it.
#[derive(Debug)]
struct RawScrollTop {
    get: Option<Function>,
    set: Option<Function>,
}

impl RawScrollTop {
    fn capture() -> Self {
        let descriptor = Reflect::get(&js_sys::global(), &"Element".into())
            .and_then(|ctor| Reflect::get(&ctor, &"prototype".into()))
            .ok()
            .and_then(|proto| proto.dyn_into::<Object>().ok())
            .map(|proto| Object::get_own_property_descriptor(&proto, &"scrollTop".into()))
            .filter(JsValue::is_object);
        let accessor = |name: &str| {
            descriptor
                .as_ref()
                .and_then(|d| Reflect::get(d, &name.into()).ok())
                .and_then(|f| f.dyn_into::<Function>().ok())
        };
        Self {
            get: accessor("get"),
            set: accessor("set"),
        }
    }

    fn is_available(&self) -> bool {
        self.get.is_some() && self.set.is_some()
    }

    fn read(&self, el: &Element) -> f64 {
        let value = match &self.get {
            Some(get) => get.call0(el),
            None => Reflect::get(el, &"scrollTop".into()),
        };
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    }

    fn write(&self, el: &Element, value: f64) {
        let value = JsValue::from_f64(value);
        match &self.set {
            Some(set) => {
                let _ = set.call1(el, &value);
            }
            None => {
                let _ = Reflect::set(el, &"scrollTop".into(), &value);
            }
        }
    }
}

/// A chat history element as the session sees it.
#[derive(Debug, Clone)]
struct DomContainer {
    el: Element,
    raw: Rc<RawScrollTop>,
    session: SessionHandle,
}

impl PartialEq for DomContainer {
    fn eq(&self, other: &Self) -> bool {
        self.el == other.el
    }
}

impl ScrollSurface for DomContainer {
    fn offset(&self) -> f64 {
        self.raw.read(&self.el)
    }

    fn write_raw(&self, value: f64) {
        self.raw.write(&self.el, value);
    }

    fn scroll_height(&self) -> f64 {
        f64::from(self.el.scroll_height())
    }

    fn client_height(&self) -> f64 {
        f64::from(self.el.client_height())
    }

    fn is_connected(&self) -> bool {
        self.el.is_connected()
    }

    fn accessor_mode(&self) -> AccessorMode {
        if self.raw.is_available() {
            AccessorMode::Bypass
        } else {
            AccessorMode::Direct
        }
    }

    fn is_guarded(&self) -> bool {
        self.el.has_attribute(GUARD_MARKER_ATTR)
    }

    fn install_guard(&self) -> bool {
        match define_guard(self) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    target: "stickyscroll::guard",
                    error = %js_message(&err),
                    "could not define scrollTop guard"
                );
                false
            }
        }
    }
}

/// Shadow `scrollTop` on the element itself. Reads pass through to the
/// native getter; writes are arbitrated by the session.
fn define_guard(container: &DomContainer) -> std::result::Result<(), JsValue> {
    let getter = {
        let el = container.el.clone();
        let raw = Rc::clone(&container.raw);
        Closure::<dyn Fn() -> f64>::new(move || raw.read(&el))
    };
    let setter = {
        let container = container.clone();
        Closure::<dyn Fn(JsValue)>::new(move |value: JsValue| {
            let value = value
                .as_f64()
                .unwrap_or_else(|| js_sys::Number::new(&value).value_of());
            guarded_write(&container, value);
        })
    };

    let descriptor = Object::new();
    Reflect::set(&descriptor, &"get".into(), &getter.into_js_value())?;
    Reflect::set(&descriptor, &"set".into(), &setter.into_js_value())?;
    Reflect::set(&descriptor, &"configurable".into(), &JsValue::TRUE)?;
    if !Reflect::define_property(&container.el, &"scrollTop".into(), &descriptor)? {
        return Err(JsValue::from_str("scrollTop is not configurable on this element"));
    }
    container.el.set_attribute(GUARD_MARKER_ATTR, "true")
}

fn guarded_write(container: &DomContainer, value: f64) {
    let Some(shared) = container.session.upgrade() else {
        container.write_raw(value);
        return;
    };
    match shared.try_borrow_mut() {
        Ok(mut session) => {
            session.host_write(container, value);
        }
        // Re-entered from inside a session callback; nothing to arbitrate against.
        Err(_) => container.write_raw(value),
    };
}

// ---------------------------------------------------------------------------
// Page host
// ---------------------------------------------------------------------------

struct DomHost {
    window: Window,
    document: Document,
    control: HtmlElement,
    raw: Rc<RawScrollTop>,
    origin: Instant,
    session: SessionHandle,
    on_scroll: OnceCell<Function>,
    on_frame: OnceCell<Function>,
    frame_pending: Cell<bool>,
}

impl DomHost {
    fn container(&self, el: Element) -> DomContainer {
        DomContainer {
            el,
            raw: Rc::clone(&self.raw),
            session: self.session.clone(),
        }
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }
}

impl PageHost for DomHost {
    type Container = DomContainer;
    type Node = Node;

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn query_container(&self) -> Option<DomContainer> {
        self.document
            .query_selector(CONTAINER_SELECTOR)
            .ok()
            .flatten()
            .map(|el| self.container(el))
    }

    fn resolve_inserted(&self, node: &Node) -> Option<DomContainer> {
        let el = node.dyn_ref::<Element>()?;
        if el.matches(CONTAINER_SELECTOR).unwrap_or(false) {
            return Some(self.container(el.clone()));
        }
        el.query_selector(CONTAINER_SELECTOR)
            .ok()
            .flatten()
            .map(|child| self.container(child))
    }

    fn attach_scroll_listener(&self, container: &DomContainer) {
        let Some(on_scroll) = self.on_scroll.get() else {
            return;
        };
        let _ = container
            .el
            .remove_event_listener_with_callback("scroll", on_scroll);
        let _ = container
            .el
            .add_event_listener_with_callback_and_add_event_listener_options(
                "scroll",
                on_scroll,
                &passive(),
            );
    }

    fn input_rect(&self) -> Option<InputRect> {
        let input = INPUT_SELECTORS
            .iter()
            .find_map(|selector| self.document.query_selector(selector).ok().flatten())?;
        let rect = input.get_bounding_client_rect();
        Some(InputRect {
            left: rect.left(),
            top: rect.top(),
            width: rect.width(),
            height: rect.height(),
        })
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    fn render_control(&self, visual: &ControlVisual) {
        let style = self.control.style();
        for (property, value) in control_style(visual).declarations() {
            let _ = style.set_property(property, &value);
        }
    }

    fn request_frame(&self) {
        if self.frame_pending.get() {
            return;
        }
        let Some(on_frame) = self.on_frame.get() else {
            return;
        };
        if self.window.request_animation_frame(on_frame).is_ok() {
            self.frame_pending.set(true);
        }
    }
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

fn passive() -> AddEventListenerOptions {
    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    options
}

fn with_session(handle: &SessionHandle, f: impl FnOnce(&mut Session)) {
    let Some(shared) = handle.upgrade() else {
        return;
    };
    let Ok(mut session) = shared.try_borrow_mut() else {
        debug!(target: "stickyscroll_web::boot", "session busy; event skipped");
        return;
    };
    f(&mut session);
}

fn session_listener(
    handle: &SessionHandle,
    f: impl Fn(&mut Session, Event) + 'static,
) -> Function {
    let handle = handle.clone();
    Closure::<dyn Fn(Event)>::new(move |event: Event| with_session(&handle, |s| f(s, event)))
        .into_js_value()
        .unchecked_into()
}

fn frame_callback(handle: &SessionHandle) -> Function {
    let handle = handle.clone();
    Closure::<dyn Fn(f64)>::new(move |_timestamp: f64| {
        with_session(&handle, |s| {
            s.host().frame_pending.set(false);
            s.frame();
        });
    })
    .into_js_value()
    .unchecked_into()
}

fn scroll_listener(handle: &SessionHandle) -> Function {
    session_listener(handle, |s, event| {
        let Some(el) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let container = s.host().container(el);
        s.scroll_observed(&container);
    })
}

fn interaction_listener(handle: &SessionHandle, source: InteractionKind) -> Function {
    session_listener(handle, move |s, _event| {
        s.signal(PageSignal::Interaction { source });
    })
}

fn pointer_listener(handle: &SessionHandle) -> Function {
    session_listener(handle, |s, event| {
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        if let Some(signal) = classify_pointer_down(
            f64::from(mouse.client_x()),
            s.host().viewport_width(),
            s.policy().scrollbar_hit_width,
        ) {
            s.signal(signal);
        }
    })
}

fn keydown_listener(handle: &SessionHandle) -> Function {
    session_listener(handle, |s, event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let focused = s.host().document.active_element();
        let tag = focused.as_ref().map(Element::tag_name);
        let role = focused.as_ref().and_then(|el| el.get_attribute("role"));
        let focus = tag.as_deref().map(|tag_name| FocusTarget {
            tag_name,
            role: role.as_deref(),
        });
        if let Some(signal) = classify_keydown(&key.key(), key.shift_key(), focus) {
            s.signal(signal);
        }
    })
}

fn click_listener(handle: &SessionHandle) -> Function {
    session_listener(handle, |s, event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let inside = |selector: &str| target.closest(selector).ok().flatten().is_some();
        let click = ClickTarget {
            in_button: inside(BUTTON_SELECTOR),
            in_send_labelled: inside(SEND_LABEL_SELECTOR),
            markup_has_icon_path: target.inner_html().contains(ICON_PATH_MARKER),
        };
        if let Some(signal) = classify_click(click) {
            s.signal(signal);
        }
    })
}

fn observe_insertions(handle: &SessionHandle, body: &HtmlElement) -> Result<MutationObserver> {
    let handle = handle.clone();
    let callback = Closure::<dyn Fn(js_sys::Array, MutationObserver)>::new(
        move |records: js_sys::Array, _observer: MutationObserver| {
            let mut inserted = Vec::new();
            for record in records.iter() {
                let Ok(record) = record.dyn_into::<MutationRecord>() else {
                    continue;
                };
                let added = record.added_nodes();
                for i in 0..added.length() {
                    if let Some(node) = added.get(i) {
                        inserted.push(node);
                    }
                }
            }
            if !inserted.is_empty() {
                with_session(&handle, |s| {
                    s.nodes_inserted(inserted);
                });
            }
        },
    );
    let callback: Function = callback.into_js_value().unchecked_into();
    let observer = MutationObserver::new(&callback).stage("creating mutation observer")?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer
        .observe_with_options(body, &init)
        .stage("observing document body")?;
    Ok(observer)
}

// ---------------------------------------------------------------------------
// Boot
// ---------------------------------------------------------------------------

struct Runtime {
    session: SharedSession,
    _observer: MutationObserver,
}

thread_local! {
    static RUNTIME: RefCell<Option<Runtime>> = const { RefCell::new(None) };
}

fn create_control(document: &Document) -> Result<HtmlElement> {
    let control: HtmlElement = document
        .create_element("div")
        .stage("creating control")?
        .dyn_into::<HtmlElement>()
        .map_err(|_| BootError::js("creating control", "div is not an HTMLElement"))?;
    control.set_id(CONTROL_ID);
    control.set_inner_html(CONTROL_ICON_SVG);
    control.style().set_css_text(CONTROL_BASE_CSS);
    Ok(control)
}

fn boot() -> Result<()> {
    if RUNTIME.with_borrow(Option::is_some) {
        return Err(BootError::AlreadyStarted);
    }
    let window = web_sys::window().ok_or(BootError::NoWindow)?;
    let document = window.document().ok_or(BootError::NoDocument)?;
    let body = document.body().ok_or(BootError::NoBody)?;
    let control = create_control(&document)?;

    let raw = Rc::new(RawScrollTop::capture());
    let accessor_available = raw.is_available();
    if !accessor_available {
        warn!(
            target: "stickyscroll_web::boot",
            "native scrollTop accessor not found; host writes will not be guarded"
        );
    }

    let policy = ScrollPolicy::default();
    let session: SharedSession = Rc::new_cyclic(|handle| {
        RefCell::new(StickySession::new(
            DomHost {
                window: window.clone(),
                document: document.clone(),
                control: control.clone(),
                raw,
                origin: Instant::now(),
                session: handle.clone(),
                on_scroll: OnceCell::new(),
                on_frame: OnceCell::new(),
                frame_pending: Cell::new(false),
            },
            policy,
        ))
    });
    let handle = Rc::downgrade(&session);
    {
        let session = session.borrow();
        let _ = session.host().on_scroll.set(scroll_listener(&handle));
        let _ = session.host().on_frame.set(frame_callback(&handle));
    }

    let options = passive();
    for (event, source) in [
        ("wheel", InteractionKind::Wheel),
        ("touchmove", InteractionKind::TouchMove),
    ] {
        window
            .add_event_listener_with_callback_and_add_event_listener_options(
                event,
                &interaction_listener(&handle, source),
                &options,
            )
            .stage("listening for manual scrolling")?;
    }
    window
        .add_event_listener_with_callback_and_add_event_listener_options(
            "mousedown",
            &pointer_listener(&handle),
            &options,
        )
        .stage("listening for scrollbar presses")?;
    document
        .add_event_listener_with_callback_and_bool("keydown", &keydown_listener(&handle), true)
        .stage("listening for keys")?;
    document
        .add_event_listener_with_callback_and_bool("click", &click_listener(&handle), true)
        .stage("listening for send clicks")?;

    control
        .add_event_listener_with_callback(
            "click",
            &session_listener(&handle, |s, _event| {
                s.manual_jump();
            }),
        )
        .stage("listening for control clicks")?;
    for (event, hovered) in [("mouseenter", true), ("mouseleave", false)] {
        control
            .add_event_listener_with_callback(
                event,
                &session_listener(&handle, move |s, _event| s.set_control_hovered(hovered)),
            )
            .stage("listening for control hover")?;
    }

    let refresh = session_listener(&handle, |s, _event| {
        s.refresh_control_position();
    });
    window
        .add_event_listener_with_callback("resize", &refresh)
        .stage("listening for resize")?;
    let refresh_ms =
        i32::try_from(policy.position_refresh_interval.as_millis()).unwrap_or(i32::MAX);
    window
        .set_interval_with_callback_and_timeout_and_arguments_0(&refresh, refresh_ms)
        .stage("scheduling control refresh")?;

    body.append_child(&control).stage("inserting control")?;
    let observer = match observe_insertions(&handle, &body) {
        Ok(observer) => observer,
        Err(err) => {
            control.remove();
            return Err(err);
        }
    };

    let initial = session.borrow_mut().start();
    info!(
        target: "stickyscroll_web::boot",
        container_present = initial.is_some(),
        accessor_available,
        "sticky scroll attached"
    );
    RUNTIME.with_borrow_mut(|runtime| {
        *runtime = Some(Runtime {
            session,
            _observer: observer,
        });
    });
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() {
    install_panic_hook();
    if let Err(err) = boot() {
        warn!(target: "stickyscroll_web::boot", error = %err, "boot failed");
        console_error(&format!("[stickyscroll] {err}"));
    }
}

/// JSON snapshot of the running session, for console debugging.
///
/// Returns `undefined` before boot completes.
#[wasm_bindgen(js_name = stickyScrollState)]
pub fn sticky_scroll_state() -> std::result::Result<Option<String>, JsValue> {
    RUNTIME.with_borrow(|runtime| {
        let Some(runtime) = runtime else {
            return Ok(None);
        };
        let session = runtime
            .session
            .try_borrow()
            .map_err(|_| JsValue::from_str("session busy"))?;
        serde_json::to_string(&session.snapshot())
            .map(Some)
            .map_err(|err| JsValue::from_str(&err.to_string()))
    })
}
