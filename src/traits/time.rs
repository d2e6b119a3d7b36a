use std::cell::Cell;
use std::time::Instant;

use crate::input::DrumTrigger;
use crate::model::DrumKind;

/// Host clock that frames and drum triggers are stamped with.
///
/// Readings are milliseconds from an arbitrary epoch; a session only ever
/// compares them against its own start time.
pub trait TimeProvider {
    fn now_ms(&self) -> f64;

    /// A trigger for `drum` stamped with the current reading.
    fn stamp(&self, drum: DrumKind) -> DrumTrigger {
        DrumTrigger::new(drum, self.now_ms())
    }
}

/// Wall clock, zeroed when the provider is created.
pub struct SystemTimeProvider {
    epoch: Instant,
}

impl SystemTimeProvider {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for SystemTimeProvider {
    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }
}

/// Manually driven clock for autoplay runs and tests.
///
/// Interior mutability lets a `SessionClock` borrow the provider while the
/// frame loop keeps advancing it.
#[derive(Debug, Default)]
pub struct MockTimeProvider {
    now: Cell<f64>,
}

impl MockTimeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(now_ms: f64) -> Self {
        Self { now: Cell::new(now_ms) }
    }

    pub fn set_time(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    /// Step forward by one frame (or any other delta).
    pub fn advance(&self, delta_ms: f64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

impl<T: TimeProvider + ?Sized> TimeProvider for &T {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}
