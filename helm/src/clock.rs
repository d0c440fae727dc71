//! Wall-clock sources for time-based easing.
//!
//! The browser build reads `Date.now()`. Tests and the headless harness use a
//! [`ManualClock`] they advance themselves, so every interpolated value is
//! reproducible.

use std::cell::Cell;
use std::rc::Rc;

/// Seconds since an arbitrary, fixed epoch.
pub type Seconds = f64;

/// A monotonic-enough source of the current time.
pub trait Clock {
    fn now_secs(&self) -> Seconds;
}

/// Browser clock backed by `Date.now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceClock;

impl Clock for PerformanceClock {
    fn now_secs(&self) -> Seconds {
        js_sys::Date::now() / 1000.0
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Seconds>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: Seconds) -> Self {
        Self { now: Rc::new(Cell::new(start)) }
    }

    pub fn set(&self, now: Seconds) {
        self.now.set(now);
    }

    pub fn advance(&self, dt: Seconds) {
        self.now.set(self.now.get() + dt);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> Seconds {
        self.now.get()
    }
}
