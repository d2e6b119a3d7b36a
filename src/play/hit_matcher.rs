use serde::Serialize;
use tracing::trace;

use crate::model::{DrumKind, NoteId};

use super::judge::{JudgeWindow, Timing};
use super::note_tracker::NoteTracker;

/// Outcome of matching one input to one note.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HitResult {
    #[serde(skip)]
    pub note_id: NoteId,
    pub drum: DrumKind,
    pub timing: Timing,
    pub score: u32,
    /// Host timestamp of the input.
    pub timestamp_ms: f64,
    /// Input time minus note time (negative = early).
    pub offset_ms: f64,
}

/// Matches drum inputs against the tracker's live notes.
#[derive(Debug, Clone, Default)]
pub struct HitMatcher {
    window: JudgeWindow,
}

impl HitMatcher {
    pub fn new(window: JudgeWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &JudgeWindow {
        &self.window
    }

    /// Resolve the closest unresolved note of `drum` to `time_in_game_ms`.
    ///
    /// Returns `None` when no live note of that drum lies within the outer
    /// window. Equal distances go to the earlier note, then the lower index.
    pub fn try_hit(
        &self,
        tracker: &mut NoteTracker,
        drum: DrumKind,
        time_in_game_ms: f64,
        timestamp_ms: f64,
    ) -> Option<HitResult> {
        let (id, offset_ms) = tracker
            .candidates(drum)
            .map(|p| (p.id, time_in_game_ms - p.note.time_ms))
            .filter(|(_, offset)| self.window.is_in_window(*offset))
            .min_by(|(a_id, a_off), (b_id, b_off)| {
                a_off
                    .abs()
                    .total_cmp(&b_off.abs())
                    .then(a_id.time_ms.total_cmp(&b_id.time_ms))
                    .then(a_id.index.cmp(&b_id.index))
            })?;

        let timing = self.window.judge(offset_ms)?;
        if !tracker.resolve(id, timing) {
            return None;
        }

        trace!(note = %id, ?timing, offset_ms, "note hit");
        Some(HitResult {
            note_id: id,
            drum,
            timing,
            score: timing.points(),
            timestamp_ms,
            offset_ms,
        })
    }
}
