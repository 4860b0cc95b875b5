//! Manual "jump to bottom" control model.
//!
//! Visibility mirrors the arbiter's scrolled-away flag; hiding is an opacity
//! and hit-testing toggle on the host side, never a DOM removal. Position is
//! derived from the message input's viewport rectangle: horizontally centred
//! over it, with the control's bottom edge `gap` pixels above its top edge.
//! The anchor is kept as the CSS `bottom` distance, so it also depends on the
//! viewport height at the time of positioning.

use serde::Serialize;

/// Input box rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InputRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Anchor of the fixed-position control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlPosition {
    /// Horizontal centre (CSS `left`).
    pub x: f64,
    /// Distance from the viewport's bottom edge (CSS `bottom`).
    pub bottom: f64,
}

impl ControlPosition {
    /// Anchor for `rect` with a `gap` above its top edge, in a viewport
    /// `viewport_height` pixels tall.
    #[must_use]
    pub fn above(rect: InputRect, gap: f64, viewport_height: f64) -> Self {
        Self {
            x: rect.left + rect.width / 2.0,
            bottom: viewport_height - (rect.top - gap),
        }
    }
}

/// Everything the host needs to paint the control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ControlVisual {
    pub visible: bool,
    pub hovered: bool,
    pub position: Option<ControlPosition>,
}

#[derive(Debug, Clone)]
pub struct ManualControl {
    visual: ControlVisual,
    gap: f64,
}

impl ManualControl {
    /// Hidden control, not yet positioned.
    #[must_use]
    pub fn new(gap: f64) -> Self {
        Self {
            visual: ControlVisual::default(),
            gap,
        }
    }

    #[must_use]
    pub const fn visual(&self) -> &ControlVisual {
        &self.visual
    }

    /// Returns whether visibility changed.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        let changed = self.visual.visible != visible;
        self.visual.visible = visible;
        changed
    }

    /// Returns whether the hover state changed.
    pub fn set_hovered(&mut self, hovered: bool) -> bool {
        let changed = self.visual.hovered != hovered;
        self.visual.hovered = hovered;
        changed
    }

    /// Re-anchor over `input`. Without an input the last position is kept.
    /// Returns whether the position changed.
    pub fn reposition(&mut self, input: Option<InputRect>, viewport_height: f64) -> bool {
        let Some(rect) = input else {
            return false;
        };
        let next = Some(ControlPosition::above(rect, self.gap, viewport_height));
        let changed = self.visual.position != next;
        self.visual.position = next;
        changed
    }
}
