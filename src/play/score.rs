use serde::{Deserialize, Serialize};

use super::judge::{Timing, TimingDirection};

/// Where a Miss came from. Both kinds reset combo the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissKind {
    /// An input matched the note but landed outside the Good window.
    Graded,
    /// No input matched before the note left the miss window.
    Timeout,
}

/// Snapshot of session statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub score: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub notes_hit: u32,
    pub total_notes: u32,
    pub perfect_hits: u32,
    pub good_hits: u32,
    pub graded_misses: u32,
    pub missed_notes: u32,
    pub early_hits: u32,
    pub late_hits: u32,
    pub accuracy: f64,
}

impl GameStats {
    /// Notes that have reached a terminal outcome.
    pub fn judged_count(&self) -> u32 {
        self.perfect_hits + self.good_hits + self.graded_misses + self.missed_notes
    }
}

/// Accumulates score, combo and accuracy over one session.
#[derive(Debug, Clone, Default)]
pub struct ScoreTracker {
    total_notes: u32,
    score: u32,
    combo: u32,
    max_combo: u32,
    notes_hit: u32,
    perfect_hits: u32,
    good_hits: u32,
    graded_misses: u32,
    missed_notes: u32,
    early_hits: u32,
    late_hits: u32,
}

impl ScoreTracker {
    pub fn new(total_notes: u32) -> Self {
        Self {
            total_notes,
            ..Self::default()
        }
    }

    /// Apply one input-judged outcome and return the updated totals.
    /// A `Miss` here counts as a graded miss.
    pub fn apply(&mut self, timing: Timing, points: u32) -> GameStats {
        if timing == Timing::Miss {
            self.graded_misses += 1;
        }
        self.record(timing, points)
    }

    /// Apply an input-driven hit, recording its early/late direction.
    pub fn apply_hit(&mut self, timing: Timing, points: u32, offset_ms: f64) -> GameStats {
        if timing != Timing::Miss {
            match TimingDirection::from_offset(offset_ms) {
                TimingDirection::Early => self.early_hits += 1,
                TimingDirection::Late => self.late_hits += 1,
                TimingDirection::Exact => {}
            }
        }
        self.apply(timing, points)
    }

    /// Apply a note that timed out.
    pub fn apply_timeout(&mut self) -> GameStats {
        self.missed_notes += 1;
        self.record(Timing::Miss, 0)
    }

    pub fn apply_miss(&mut self, kind: MissKind) -> GameStats {
        match kind {
            MissKind::Graded => self.apply_hit(Timing::Miss, 0, 0.0),
            MissKind::Timeout => self.apply_timeout(),
        }
    }

    fn record(&mut self, timing: Timing, points: u32) -> GameStats {
        self.score += points;
        match timing {
            Timing::Perfect => {
                self.perfect_hits += 1;
                self.notes_hit += 1;
                self.combo += 1;
            }
            Timing::Good => {
                self.good_hits += 1;
                self.notes_hit += 1;
                self.combo += 1;
            }
            Timing::Miss => {
                self.combo = 0;
            }
        }
        self.max_combo = self.max_combo.max(self.combo);
        self.snapshot()
    }

    /// `notes_hit / total_notes * 100`, or 0 for an empty track.
    pub fn accuracy(&self) -> f64 {
        if self.total_notes == 0 {
            return 0.0;
        }
        self.notes_hit as f64 / self.total_notes as f64 * 100.0
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn notes_hit(&self) -> u32 {
        self.notes_hit
    }

    pub fn total_notes(&self) -> u32 {
        self.total_notes
    }

    pub fn snapshot(&self) -> GameStats {
        GameStats {
            score: self.score,
            combo: self.combo,
            max_combo: self.max_combo,
            notes_hit: self.notes_hit,
            total_notes: self.total_notes,
            perfect_hits: self.perfect_hits,
            good_hits: self.good_hits,
            graded_misses: self.graded_misses,
            missed_notes: self.missed_notes,
            early_hits: self.early_hits,
            late_hits: self.late_hits,
            accuracy: self.accuracy(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.total_notes);
    }
}
