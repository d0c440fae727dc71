//! Eased transitions between two 3D points.
//!
//! A [`MotionBox`] remembers where a value is coming from, where it is going,
//! and when the current transition started. Sampling it is a pure function of
//! the supplied time: the interpolation parameter is clamped to `[0, 1]` and
//! passed through a quarter-sine ease-out so motion starts responsively and
//! settles with zero velocity.
//!
//! Re-targeting always starts from the value the box shows *right now*, so an
//! interrupted transition never produces a jump.

#[cfg(test)]
#[path = "motion_test.rs"]
mod motion_test;

use std::f64::consts::FRAC_PI_2;

use glam::DVec3;

use crate::clock::Seconds;

/// Quarter-sine ease-out over `t` in `[0, 1]`.
#[must_use]
pub fn ease(t: f64) -> f64 {
    (t.clamp(0.0, 1.0) * FRAC_PI_2).sin()
}

/// A smoothed transition from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionBox {
    from: DVec3,
    to: DVec3,
    start: Seconds,
    duration: Seconds,
}

impl Default for MotionBox {
    fn default() -> Self {
        Self { from: DVec3::ZERO, to: DVec3::ZERO, start: 0.0, duration: 0.0 }
    }
}

impl MotionBox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ease duration in seconds.
    #[must_use]
    pub fn duration(mut self, seconds: Seconds) -> Self {
        self.duration = seconds.max(0.0);
        self
    }

    /// Progress of the current transition in `[0, 1]`, before easing.
    #[must_use]
    pub fn progress(&self, now: Seconds) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.duration).clamp(0.0, 1.0)
    }

    /// Sample the value at `now`.
    #[must_use]
    pub fn evolve(&self, now: Seconds) -> DVec3 {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.to;
        }
        self.from.lerp(self.to, ease(t))
    }

    /// Re-target toward `target`, starting from the currently shown value.
    pub fn update_to(&mut self, target: DVec3, now: Seconds) {
        self.from = self.evolve(now);
        self.to = target;
        self.start = now;
    }

    /// End any transition immediately at the current target.
    pub fn complete(&mut self, now: Seconds) {
        self.from = self.to;
        self.start = now;
    }

    /// Where the box is heading.
    #[must_use]
    pub fn target(&self) -> DVec3 {
        self.to
    }

    /// Where the current transition started.
    #[must_use]
    pub fn origin(&self) -> DVec3 {
        self.from
    }

    /// Whether the value has reached its target at `now`.
    #[must_use]
    pub fn is_settled(&self, now: Seconds) -> bool {
        self.progress(now) >= 1.0 || self.from == self.to
    }
}
