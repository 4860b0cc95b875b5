//! Paint model for the jump-to-bottom control.
//!
//! The element is created once with [`CONTROL_BASE_CSS`]; afterwards every
//! [`ControlVisual`] change is applied as the small set of inline
//! declarations returned by [`control_style`].

use stickyscroll_core::ControlVisual;

/// Down-arrow icon.
pub const CONTROL_ICON_SVG: &str = r#"<svg width="16" height="16" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2.5" stroke-linecap="round" stroke-linejoin="round"><path d="M12 5v14M19 12l-7 7-7-7"/></svg>"#;

/// Initial inline style: fixed, round, hidden, centred on its `left`.
pub const CONTROL_BASE_CSS: &str = "position: fixed; width: 32px; height: 32px; \
background: #1e1f20; color: #e3e3e3; border-radius: 50%; display: flex; \
align-items: center; justify-content: center; cursor: pointer; z-index: 9999; \
border: 1px solid #444; box-shadow: 0 4px 12px rgba(0,0,0,0.4); opacity: 0; \
pointer-events: none; transition: opacity 0.2s ease, \
transform 0.2s cubic-bezier(0.175, 0.885, 0.32, 1.275); \
transform: translateX(-50%) scale(1);";

const HOVER_SCALE: f64 = 1.1;
const REST_SHADOW: &str = "0 4px 12px rgba(0,0,0,0.4)";
const HOVER_SHADOW: &str = "0 6px 16px rgba(0,0,0,0.5)";
const REST_BORDER: &str = "#444";
const HOVER_BORDER: &str = "#666";

/// Inline declarations for one visual state.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlStyle {
    pub opacity: &'static str,
    pub pointer_events: &'static str,
    pub transform: String,
    pub box_shadow: &'static str,
    pub border_color: &'static str,
    /// `left` in px; absent until the input box has been located.
    pub left: Option<String>,
    /// `bottom` in px; absent until the input box has been located.
    pub bottom: Option<String>,
}

impl ControlStyle {
    /// `(property, value)` pairs in application order.
    #[must_use]
    pub fn declarations(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            ("opacity", self.opacity.to_string()),
            ("pointer-events", self.pointer_events.to_string()),
            ("transform", self.transform.clone()),
            ("box-shadow", self.box_shadow.to_string()),
            ("border-color", self.border_color.to_string()),
        ];
        if let Some(left) = &self.left {
            out.push(("left", left.clone()));
        }
        if let Some(bottom) = &self.bottom {
            out.push(("bottom", bottom.clone()));
        }
        out
    }
}

/// Style for `visual`.
#[must_use]
pub fn control_style(visual: &ControlVisual) -> ControlStyle {
    let scale = if visual.hovered { HOVER_SCALE } else { 1.0 };
    ControlStyle {
        opacity: if visual.visible { "1" } else { "0" },
        pointer_events: if visual.visible { "auto" } else { "none" },
        transform: format!("translateX(-50%) scale({scale})"),
        box_shadow: if visual.hovered { HOVER_SHADOW } else { REST_SHADOW },
        border_color: if visual.hovered { HOVER_BORDER } else { REST_BORDER },
        left: visual.position.map(|p| format!("{}px", p.x)),
        bottom: visual.position.map(|p| format!("{}px", p.bottom)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stickyscroll_core::ControlPosition;

    #[test]
    fn hidden_control_ignores_pointer() {
        let style = control_style(&ControlVisual::default());
        assert_eq!(style.opacity, "0");
        assert_eq!(style.pointer_events, "none");
        assert_eq!(style.left, None);
        assert_eq!(style.bottom, None);
        assert_eq!(style.declarations().len(), 5);
    }

    #[test]
    fn visible_control_anchors_above_input() {
        let visual = ControlVisual {
            visible: true,
            hovered: false,
            position: Some(ControlPosition {
                x: 600.0,
                bottom: 130.0,
            }),
        };
        let style = control_style(&visual);
        assert_eq!(
            style.declarations(),
            vec![
                ("opacity", "1".to_string()),
                ("pointer-events", "auto".to_string()),
                ("transform", "translateX(-50%) scale(1)".to_string()),
                ("box-shadow", "0 4px 12px rgba(0,0,0,0.4)".to_string()),
                ("border-color", "#444".to_string()),
                ("left", "600px".to_string()),
                ("bottom", "130px".to_string()),
            ]
        );
    }

    #[test]
    fn hover_enlarges_and_darkens_border() {
        let visual = ControlVisual {
            visible: true,
            hovered: true,
            position: None,
        };
        let style = control_style(&visual);
        assert_eq!(style.transform, "translateX(-50%) scale(1.1)");
        assert_eq!(style.box_shadow, "0 6px 16px rgba(0,0,0,0.5)");
        assert_eq!(style.border_color, "#666");
    }

    #[test]
    fn base_css_starts_hidden() {
        assert!(CONTROL_BASE_CSS.contains("opacity: 0;"));
        assert!(CONTROL_BASE_CSS.contains("pointer-events: none;"));
        assert!(CONTROL_ICON_SVG.contains("<path"));
    }
}
