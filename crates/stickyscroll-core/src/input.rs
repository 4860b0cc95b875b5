#![forbid(unsafe_code)]

//! Page input classification.
//!
//! The host forwards raw DOM facts (key names, pointer coordinates, what a
//! click landed inside) and these functions turn them into the two signals the
//! arbiter understands: manual interaction and message submission.

use serde::Serialize;

/// DOM `key` values that scroll the container.
pub const NAVIGATION_KEYS: [&str; 7] = [
    "ArrowUp", "ArrowDown", "PageUp", "PageDown", "Home", "End", " ",
];

/// Source of a manual-interaction signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Wheel,
    TouchMove,
    NavigationKey,
    ScrollbarPress,
    ControlClick,
}

/// Arbiter-level meaning of one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PageSignal {
    Interaction { source: InteractionKind },
    Submit,
}

/// The element holding focus when a key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTarget<'a> {
    /// Upper-case tag name as reported by the DOM (`TEXTAREA`).
    pub tag_name: &'a str,
    /// Value of the `role` attribute, if any.
    pub role: Option<&'a str>,
}

impl FocusTarget<'_> {
    /// Whether typing into this element composes a message.
    #[must_use]
    pub fn is_text_entry(&self) -> bool {
        self.tag_name.eq_ignore_ascii_case("textarea") || self.role == Some("textbox")
    }
}

/// Where a click landed, as resolved by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickTarget {
    /// The target is (inside) a `button`.
    pub in_button: bool,
    /// The target is inside an element whose `aria-label` mentions sending.
    pub in_send_labelled: bool,
    /// The target's markup contains an icon `path`.
    pub markup_has_icon_path: bool,
}

/// Classify a keydown.
#[must_use]
pub fn classify_keydown(
    key: &str,
    shift: bool,
    focus: Option<FocusTarget<'_>>,
) -> Option<PageSignal> {
    if key == "Enter" {
        return (!shift && focus.is_some_and(|f| f.is_text_entry())).then_some(PageSignal::Submit);
    }
    NAVIGATION_KEYS
        .contains(&key)
        .then_some(PageSignal::Interaction {
            source: InteractionKind::NavigationKey,
        })
}

/// Classify a mousedown: presses on the right-edge band grab the scrollbar.
#[must_use]
pub fn classify_pointer_down(
    client_x: f64,
    viewport_width: f64,
    hit_width: f64,
) -> Option<PageSignal> {
    (client_x > viewport_width - hit_width).then_some(PageSignal::Interaction {
        source: InteractionKind::ScrollbarPress,
    })
}

/// Classify a click: a button carrying a send affordance submits.
#[must_use]
pub fn classify_click(target: ClickTarget) -> Option<PageSignal> {
    (target.in_button && (target.in_send_labelled || target.markup_has_icon_path))
        .then_some(PageSignal::Submit)
}
