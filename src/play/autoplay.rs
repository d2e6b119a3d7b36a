//! Scripted drum input for demos, tests and benchmarks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::input::DrumTrigger;
use crate::traits::input::DrumInputSource;

use super::session::GameSession;

/// How the autoplayer strikes each note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoplayStyle {
    /// Constant offset added to every strike (negative = early).
    pub offset_ms: f64,
    /// Uniform random spread applied on top of the offset.
    pub jitter_ms: f64,
    pub seed: u64,
}

impl Default for AutoplayStyle {
    fn default() -> Self {
        Self {
            offset_ms: 0.0,
            jitter_ms: 0.0,
            seed: 0,
        }
    }
}

/// Pre-computed strikes for every note of a session, in host time.
pub struct Autoplay {
    triggers: Vec<DrumTrigger>,
    current_index: usize,
}

impl Autoplay {
    pub fn new(session: &GameSession, style: AutoplayStyle) -> Self {
        let mut rng = StdRng::seed_from_u64(style.seed);
        let base = session.start_time_ms() + session.config().latency_offset_ms;

        let mut triggers: Vec<DrumTrigger> = session
            .beat_map()
            .notes()
            .iter()
            .map(|note| {
                let jitter = if style.jitter_ms > 0.0 {
                    rng.gen_range(-style.jitter_ms..=style.jitter_ms)
                } else {
                    0.0
                };
                DrumTrigger::new(note.drum, base + note.time_ms + style.offset_ms + jitter)
            })
            .collect();
        triggers.sort_by(|a, b| a.timestamp_ms.total_cmp(&b.timestamp_ms));

        Self {
            triggers,
            current_index: 0,
        }
    }

    pub fn triggers(&self) -> &[DrumTrigger] {
        &self.triggers
    }

    /// Host time of the next strike.
    pub fn next_time_ms(&self) -> Option<f64> {
        self.triggers.get(self.current_index).map(|t| t.timestamp_ms)
    }

    pub fn reset(&mut self) {
        self.current_index = 0;
    }
}

impl DrumInputSource for Autoplay {
    fn poll_triggers(&mut self, now_ms: f64) -> Vec<DrumTrigger> {
        let start = self.current_index;
        while self
            .triggers
            .get(self.current_index)
            .is_some_and(|t| t.timestamp_ms <= now_ms)
        {
            self.current_index += 1;
        }
        self.triggers[start..self.current_index].to_vec()
    }

    fn is_exhausted(&self) -> bool {
        self.current_index >= self.triggers.len()
    }
}
