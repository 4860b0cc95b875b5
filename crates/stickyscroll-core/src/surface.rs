//! The offset accessor capability.
//!
//! A [`ScrollSurface`] is one live scroll container as seen by the engine. Its
//! `offset`/`write_raw` pair must go through the platform accessor captured
//! before any interception was installed, so engine writes are never subject
//! to the guard.

use serde::Serialize;

use crate::state::ArbiterState;

/// How the surface reaches the underlying offset property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessorMode {
    /// The platform accessor was captured; raw writes skip the guard.
    Bypass,
    /// No accessor could be captured; reads and writes use plain property
    /// access and no guard can be layered on top.
    Direct,
}

/// Geometry of a container at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollMetrics {
    pub offset: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    /// Pixels of content below the visible viewport.
    #[must_use]
    pub fn distance_from_bottom(&self) -> f64 {
        self.scroll_height - (self.offset + self.client_height)
    }
}

/// One live scroll container.
///
/// Methods take `&self`: platform handles are shared references with interior
/// mutability.
pub trait ScrollSurface {
    /// True current offset (accessor read).
    fn offset(&self) -> f64;

    /// Write the offset through the captured accessor, skipping the guard.
    fn write_raw(&self, value: f64);

    /// Engine write issued while `state` marks it as programmatic.
    ///
    /// Surfaces that deliver scroll notifications synchronously consult
    /// `state` here; the default is a plain raw write.
    fn write_programmatic(&self, value: f64, _state: &ArbiterState) {
        self.write_raw(value);
    }

    /// Total scrollable content height.
    fn scroll_height(&self) -> f64;

    /// Visible viewport height.
    fn client_height(&self) -> f64;

    /// Whether the container is still attached to the page.
    fn is_connected(&self) -> bool {
        true
    }

    /// Accessor capability of this surface.
    fn accessor_mode(&self) -> AccessorMode {
        AccessorMode::Bypass
    }

    /// Whether the per-element guard marker is present.
    fn is_guarded(&self) -> bool;

    /// Layer the write guard over the offset property and set the marker.
    ///
    /// Returns `false` when the platform cannot intercept the property.
    fn install_guard(&self) -> bool;

    /// Snapshot of the current geometry.
    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            offset: self.offset(),
            scroll_height: self.scroll_height(),
            client_height: self.client_height(),
        }
    }
}
