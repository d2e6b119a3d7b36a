//! Note lifecycle tracking.
//!
//! Notes move `Upcoming -> Pending -> Resolved | Missed`. A note enters the
//! working set when it comes within the look-ahead window and leaves it once
//! it is more than the miss window past due. Pending notes leaving that way
//! are reported as missed exactly once.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::model::{BeatMap, BeatMapNote, DrumKind, NoteId};

use super::judge::Timing;

/// Lifecycle state of one beat map note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    /// Not yet inside the look-ahead window.
    Upcoming,
    /// Live and matchable.
    Pending,
    /// Matched by an input.
    Resolved(Timing),
    /// Passed the miss window unmatched.
    Missed,
}

impl NoteState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Resolved or missed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved(_) | Self::Missed)
    }
}

/// Working-set entry for a note inside the look-ahead window.
#[derive(Debug, Clone, Copy)]
pub struct PendingNote {
    pub id: NoteId,
    pub note: BeatMapNote,
    pub resolved: bool,
    pub outcome: Option<Timing>,
}

/// A note the renderer should draw this frame.
#[derive(Debug, Clone, Copy)]
pub struct VisibleNote {
    pub id: NoteId,
    pub note: BeatMapNote,
    /// Note time minus now (negative once the note is past the hit line).
    pub time_until_ms: f64,
    /// Normalized travel: 0.0 at the look-ahead edge, 1.0 at the miss boundary.
    pub progress: f64,
    /// Set once the note has been hit; resolved notes stay visible for feedback.
    pub outcome: Option<Timing>,
}

impl VisibleNote {
    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }
}

/// A note that timed out without being hit.
#[derive(Debug, Clone, Copy)]
pub struct MissedNote {
    pub id: NoteId,
    pub note: BeatMapNote,
}

/// Result of one refresh.
#[derive(Debug, Clone, Default)]
pub struct RefreshOutcome {
    pub visible: Vec<VisibleNote>,
    pub newly_missed: Vec<MissedNote>,
}

pub struct NoteTracker {
    beat_map: Arc<BeatMap>,
    look_ahead_ms: f64,
    miss_window_ms: f64,
    /// Note indices sorted by (time, index).
    order: Vec<usize>,
    admit_cursor: usize,
    states: Vec<NoteState>,
    working: Vec<PendingNote>,
    last_now_ms: Option<f64>,
}

impl NoteTracker {
    pub fn new(beat_map: Arc<BeatMap>, look_ahead_ms: f64, miss_window_ms: f64) -> Self {
        let notes = beat_map.notes();
        let mut order: Vec<usize> = (0..notes.len()).collect();
        order.sort_by(|&a, &b| notes[a].time_ms.total_cmp(&notes[b].time_ms).then(a.cmp(&b)));
        let states = vec![NoteState::Upcoming; notes.len()];

        Self {
            beat_map,
            look_ahead_ms,
            miss_window_ms,
            order,
            admit_cursor: 0,
            states,
            working: Vec::new(),
            last_now_ms: None,
        }
    }

    pub fn beat_map(&self) -> &Arc<BeatMap> {
        &self.beat_map
    }

    /// Advance to `now_ms` (track time) and return visible notes plus new misses.
    ///
    /// A `now_ms` earlier than a previous call is clamped to the latest time
    /// seen; the working set never moves backwards.
    pub fn refresh(&mut self, now_ms: f64) -> RefreshOutcome {
        let now = match self.last_now_ms {
            Some(last) if now_ms < last => {
                warn!(now_ms, last_ms = last, "non-monotonic clock sample clamped");
                last
            }
            _ => now_ms,
        };
        self.last_now_ms = Some(now);

        let mut newly_missed = Vec::new();
        let beat_map = Arc::clone(&self.beat_map);
        let notes = beat_map.notes();

        while let Some(&index) = self.order.get(self.admit_cursor) {
            let note = notes[index];
            let time_until = note.time_ms - now;
            if time_until > self.look_ahead_ms {
                break;
            }
            self.admit_cursor += 1;

            let id = NoteId::of(index, &note);
            if time_until < -self.miss_window_ms {
                // Skipped straight past its window in one step.
                self.states[index] = NoteState::Missed;
                newly_missed.push(MissedNote { id, note });
                continue;
            }
            self.admit(id, note);
        }

        let miss_window = self.miss_window_ms;
        let states = &mut self.states;
        self.working.retain(|pending| {
            if pending.note.time_ms - now >= -miss_window {
                return true;
            }
            if !pending.resolved {
                states[pending.id.index] = NoteState::Missed;
                newly_missed.push(MissedNote {
                    id: pending.id,
                    note: pending.note,
                });
            }
            false
        });

        newly_missed.sort_by(|a, b| {
            a.note
                .time_ms
                .total_cmp(&b.note.time_ms)
                .then(a.id.index.cmp(&b.id.index))
        });
        for missed in &newly_missed {
            debug!(note = %missed.id, "note missed");
        }

        let visible = self
            .working
            .iter()
            .map(|pending| {
                let time_until_ms = pending.note.time_ms - now;
                VisibleNote {
                    id: pending.id,
                    note: pending.note,
                    time_until_ms,
                    progress: self.progress(time_until_ms),
                    outcome: pending.outcome,
                }
            })
            .collect();

        RefreshOutcome {
            visible,
            newly_missed,
        }
    }

    /// Admit every note within the look-ahead of `now_ms` without moving the
    /// clock or evicting anything. Misses are only decided by `refresh`.
    pub fn admit_until(&mut self, now_ms: f64) {
        let beat_map = Arc::clone(&self.beat_map);
        let notes = beat_map.notes();
        while let Some(&index) = self.order.get(self.admit_cursor) {
            let note = notes[index];
            if note.time_ms - now_ms > self.look_ahead_ms {
                break;
            }
            self.admit_cursor += 1;
            self.admit(NoteId::of(index, &note), note);
        }
    }

    fn admit(&mut self, id: NoteId, note: BeatMapNote) {
        self.states[id.index] = NoteState::Pending;
        self.working.push(PendingNote {
            id,
            note,
            resolved: false,
            outcome: None,
        });
    }

    /// Linear travel position for a given time-until-hit.
    pub fn progress(&self, time_until_ms: f64) -> f64 {
        let span = self.look_ahead_ms + self.miss_window_ms;
        if span <= 0.0 {
            return 1.0;
        }
        ((self.look_ahead_ms - time_until_ms) / span).clamp(0.0, 1.0)
    }

    /// Progress value at which a note sits exactly on the hit line.
    pub fn hit_line_progress(&self) -> f64 {
        self.progress(0.0)
    }

    /// Mark a pending note as hit. Returns false if it is not live or already resolved.
    pub fn resolve(&mut self, id: NoteId, timing: Timing) -> bool {
        let Some(pending) = self
            .working
            .iter_mut()
            .find(|p| p.id == id && !p.resolved)
        else {
            return false;
        };
        pending.resolved = true;
        pending.outcome = Some(timing);
        self.states[id.index] = NoteState::Resolved(timing);
        true
    }

    /// Unresolved working-set notes for one drum.
    pub fn candidates(&self, drum: DrumKind) -> impl Iterator<Item = &PendingNote> + '_ {
        self.working
            .iter()
            .filter(move |p| !p.resolved && p.note.drum == drum)
    }

    /// Force every note that is not yet resolved or missed into `Missed`.
    pub fn flush_unresolved(&mut self) -> Vec<MissedNote> {
        let notes = self.beat_map.notes();
        let mut flushed = Vec::new();
        for &index in &self.order {
            if self.states[index].is_terminal() {
                continue;
            }
            let note = notes[index];
            self.states[index] = NoteState::Missed;
            flushed.push(MissedNote {
                id: NoteId::of(index, &note),
                note,
            });
        }
        self.admit_cursor = self.order.len();
        self.working.clear();
        flushed
    }

    /// Drop the working set without reporting anything.
    pub fn clear(&mut self) {
        self.working.clear();
    }

    pub fn state(&self, index: usize) -> Option<NoteState> {
        self.states.get(index).copied()
    }

    pub fn working_set(&self) -> &[PendingNote] {
        &self.working
    }

    pub fn last_refresh_ms(&self) -> Option<f64> {
        self.last_now_ms
    }

    pub fn look_ahead_ms(&self) -> f64 {
        self.look_ahead_ms
    }

    pub fn miss_window_ms(&self) -> f64 {
        self.miss_window_ms
    }

    pub fn all_notes_processed(&self) -> bool {
        self.states.iter().all(NoteState::is_terminal)
    }
}
