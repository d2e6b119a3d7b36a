use crate::model::BeatMapNote;
use crate::play::{HitResult, SessionSummary, VisibleNote};

/// Consumer of per-frame engine output (renderer, HUD, result screen).
/// All methods default to no-ops so a consumer implements only what it needs.
pub trait SessionObserver {
    fn on_notes_visible(&mut self, _notes: &[VisibleNote]) {}

    fn on_hit(&mut self, _hit: &HitResult) {}

    fn on_miss(&mut self, _note: &BeatMapNote) {}

    fn on_session_complete(&mut self, _summary: &SessionSummary) {}
}
