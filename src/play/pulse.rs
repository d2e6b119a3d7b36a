/// Eighth-note metronome pulse shown next to the highway.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatPulse {
    interval_ms: f64,
    pulse_ms: f64,
}

/// Pulse reading at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseState {
    /// Index of the current eighth note since track start.
    pub subdivision: u64,
    /// True during the first part of the subdivision.
    pub pulsing: bool,
}

impl BeatPulse {
    const DEFAULT_PULSE_MS: f64 = 200.0;

    pub fn new(bpm: f64) -> Self {
        Self {
            interval_ms: 60_000.0 / bpm / 2.0,
            pulse_ms: Self::DEFAULT_PULSE_MS,
        }
    }

    pub fn with_pulse_ms(mut self, pulse_ms: f64) -> Self {
        self.pulse_ms = pulse_ms;
        self
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// `None` before the track starts.
    pub fn at(&self, elapsed_ms: f64) -> Option<PulseState> {
        if elapsed_ms < 0.0 || !self.interval_ms.is_finite() || self.interval_ms <= 0.0 {
            return None;
        }
        let subdivision = (elapsed_ms / self.interval_ms).floor();
        let into = elapsed_ms - subdivision * self.interval_ms;
        Some(PulseState {
            subdivision: subdivision as u64,
            pulsing: into < self.pulse_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifty_bpm_pulses_every_600ms() {
        let pulse = BeatPulse::new(50.0);
        assert!((pulse.interval_ms() - 600.0).abs() < 1e-9);

        assert_eq!(
            pulse.at(0.0),
            Some(PulseState {
                subdivision: 0,
                pulsing: true
            })
        );
        assert_eq!(pulse.at(199.0).map(|p| p.pulsing), Some(true));
        assert_eq!(pulse.at(200.0).map(|p| p.pulsing), Some(false));
        assert_eq!(pulse.at(1250.0).map(|p| p.subdivision), Some(2));
    }

    #[test]
    fn no_pulse_before_start() {
        assert_eq!(BeatPulse::new(120.0).at(-1.0), None);
    }
}
