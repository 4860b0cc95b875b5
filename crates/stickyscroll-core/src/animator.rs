//! Time-boxed eased offset transitions.
//!
//! An [`Animation`] carries its own loop state and is advanced once per
//! display refresh by the session. Every sample is a bypass write so the
//! transition succeeds regardless of the guard. Starting a new animation
//! replaces the old one; it simply restarts from the offset currently held.
//! There is no mid-flight cancellation.

use core::time::Duration;

use serde::Serialize;
use tracing::trace;

use crate::port::ScrollPort;
use crate::surface::ScrollSurface;

/// Cubic ease-out: `1 - (1 - p)^3`, with `p` clamped to `[0, 1]`.
#[must_use]
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    let inv = 1.0 - p;
    1.0 - inv * inv * inv
}

/// Result of advancing an animation by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AnimationStep {
    Running { value: f64 },
    Finished { value: f64 },
}

impl AnimationStep {
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Running { value } | Self::Finished { value } => value,
        }
    }

    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

/// One eased transition from `from` to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Animation {
    from: f64,
    target: f64,
    started_at: Duration,
    duration: Duration,
}

impl Animation {
    #[must_use]
    pub const fn new(from: f64, target: f64, started_at: Duration, duration: Duration) -> Self {
        Self {
            from,
            target,
            started_at,
            duration,
        }
    }

    #[must_use]
    pub const fn target(&self) -> f64 {
        self.target
    }

    /// Linear progress in `[0, 1]`. A zero duration is complete immediately.
    #[must_use]
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Compute the sample for `now` without writing it.
    #[must_use]
    pub fn sample(&self, now: Duration) -> AnimationStep {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return AnimationStep::Finished { value: self.target };
        }
        let value = self.from + (self.target - self.from) * ease_out_cubic(progress);
        AnimationStep::Running { value }
    }

    /// Sample and write through the bypass path. The final sample is forced
    /// to exactly `target`.
    pub fn step<S: ScrollSurface + ?Sized>(
        &self,
        port: &mut ScrollPort<'_, S>,
        now: Duration,
    ) -> AnimationStep {
        let step = self.sample(now);
        port.write_bypass(step.value());
        trace!(
            target: "stickyscroll::animator",
            value = step.value(),
            target_offset = self.target,
            finished = step.is_finished(),
            "animation sample"
        );
        step
    }
}
