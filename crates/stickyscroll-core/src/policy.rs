//! Arbitration thresholds and timings.
//!
//! These are compile-time constants; [`ScrollPolicy::default`] is the only
//! policy the browser binding ever uses. Tests build tighter policies to keep
//! scenarios short.

use core::time::Duration;

/// Distance from the bottom (px) beyond which the user counts as scrolled away.
pub const SCROLL_AWAY_THRESHOLD_PX: f64 = 80.0;
/// Manual input younger than this marks a near-bottom scroll as user-initiated.
pub const RECENT_INTERACTION_WINDOW: Duration = Duration::from_millis(500);
/// Length of the eased jump-to-bottom transition.
pub const MANUAL_JUMP_DURATION: Duration = Duration::from_millis(700);
/// Drift (px) the send-intent enforcer tolerates before correcting.
pub const ENFORCER_TOLERANCE_PX: f64 = 10.0;
/// Hard cap on a send-intent enforcement session.
pub const ENFORCER_MAX_DURATION: Duration = Duration::from_millis(4000);
/// How often the manual control re-measures the input box.
pub const POSITION_REFRESH_INTERVAL: Duration = Duration::from_millis(500);
/// Gap (px) between the manual control and the input box's top edge.
pub const CONTROL_GAP_PX: f64 = 30.0;
/// Width (px) of the right-edge band where a press counts as a scrollbar grab.
pub const SCROLLBAR_HIT_WIDTH_PX: f64 = 30.0;

/// Tuning knobs for scroll arbitration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPolicy {
    /// Distance from the bottom (px) that flips the session into "scrolled away".
    pub scroll_away_threshold: f64,

    /// Recency window separating a user return-to-bottom from a host pull.
    pub recent_interaction_window: Duration,

    /// Duration of the manual jump animation.
    pub manual_jump_duration: Duration,

    /// Drift tolerance of the send-intent enforcer (px).
    pub enforcer_tolerance: f64,

    /// Failsafe expiry of the send-intent enforcer.
    pub enforcer_max_duration: Duration,

    /// Manual control re-positioning period.
    pub position_refresh_interval: Duration,

    /// Vertical gap above the input box (px).
    pub control_gap: f64,

    /// Right-edge band treated as the scrollbar (px).
    pub scrollbar_hit_width: f64,
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        Self {
            scroll_away_threshold: SCROLL_AWAY_THRESHOLD_PX,
            recent_interaction_window: RECENT_INTERACTION_WINDOW,
            manual_jump_duration: MANUAL_JUMP_DURATION,
            enforcer_tolerance: ENFORCER_TOLERANCE_PX,
            enforcer_max_duration: ENFORCER_MAX_DURATION,
            position_refresh_interval: POSITION_REFRESH_INTERVAL,
            control_gap: CONTROL_GAP_PX,
            scrollbar_hit_width: SCROLLBAR_HIT_WIDTH_PX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_constants() {
        let policy = ScrollPolicy::default();
        assert_eq!(policy.scroll_away_threshold, 80.0);
        assert_eq!(policy.recent_interaction_window, Duration::from_millis(500));
        assert_eq!(policy.manual_jump_duration, Duration::from_millis(700));
        assert_eq!(policy.enforcer_tolerance, 10.0);
        assert_eq!(policy.enforcer_max_duration, Duration::from_secs(4));
        assert_eq!(policy.position_refresh_interval, Duration::from_millis(500));
    }

    #[test]
    fn enforcer_outlives_recency_window() {
        let policy = ScrollPolicy::default();
        assert!(policy.enforcer_max_duration > policy.recent_interaction_window);
        assert!(policy.manual_jump_duration > policy.recent_interaction_window);
    }
}
