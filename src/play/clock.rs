use crate::traits::time::TimeProvider;

/// Monotonic elapsed-time source for one session.
///
/// Samples never go backwards even if the underlying provider does.
pub struct SessionClock<T: TimeProvider> {
    provider: T,
    origin_ms: f64,
    last_ms: f64,
    running: bool,
}

impl<T: TimeProvider> SessionClock<T> {
    /// Start a clock whose zero is the provider's current reading.
    pub fn start(provider: T) -> Self {
        let origin_ms = provider.now_ms();
        Self {
            provider,
            origin_ms,
            last_ms: 0.0,
            running: true,
        }
    }

    /// Milliseconds since start. Frozen after `stop`.
    pub fn sample(&mut self) -> f64 {
        if self.running {
            let elapsed = self.provider.now_ms() - self.origin_ms;
            self.last_ms = self.last_ms.max(elapsed);
        }
        self.last_ms
    }

    /// Provider reading at the clock's zero.
    pub fn origin_ms(&self) -> f64 {
        self.origin_ms
    }

    /// Convert a provider timestamp into clock time.
    pub fn to_elapsed(&self, timestamp_ms: f64) -> f64 {
        timestamp_ms - self.origin_ms
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Re-zero at the provider's current reading.
    pub fn restart(&mut self) {
        self.origin_ms = self.provider.now_ms();
        self.last_ms = 0.0;
        self.running = true;
    }

    pub fn provider(&self) -> &T {
        &self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::time::MockTimeProvider;

    #[test]
    fn samples_are_relative_and_monotonic() {
        let tp = MockTimeProvider::new();
        tp.set_time(10_000.0);
        let mut clock = SessionClock::start(&tp);

        tp.advance(250.0);
        assert!((clock.sample() - 250.0).abs() < f64::EPSILON);

        tp.set_time(10_100.0);
        assert!((clock.sample() - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stop_freezes_and_restart_rezeroes() {
        let tp = MockTimeProvider::new();
        let mut clock = SessionClock::start(&tp);
        tp.advance(100.0);
        clock.sample();
        clock.stop();
        tp.advance(900.0);
        assert!((clock.sample() - 100.0).abs() < f64::EPSILON);

        clock.restart();
        assert!(clock.is_running());
        tp.advance(5.0);
        assert!((clock.sample() - 5.0).abs() < f64::EPSILON);
    }
}
