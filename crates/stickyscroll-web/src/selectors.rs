//! DOM query strings and attribute names used by the binding.

/// The chat history scroller.
pub const CONTAINER_SELECTOR: &str = "infinite-scroller.chat-history";

/// Message input candidates, tried in order.
pub const INPUT_SELECTORS: [&str; 2] = ["textarea", "rich-textarea"];

/// Ancestor marking a send affordance.
pub const SEND_LABEL_SELECTOR: &str = r#"[aria-label*="Send"]"#;

/// Ancestor tag for click classification.
pub const BUTTON_SELECTOR: &str = "button";

/// Marker attribute set on a container once its `scrollTop` is guarded.
pub const GUARD_MARKER_ATTR: &str = "data-stickyscroll-guarded";

/// Id given to the control element.
pub const CONTROL_ID: &str = "stickyscroll-jump";

/// Substring of a click target's markup that identifies an icon button.
pub const ICON_PATH_MARKER: &str = "path";
