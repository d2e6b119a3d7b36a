use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::drum::DrumKind;

/// Visual/matching lane of a note (0 = leftmost).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Lane(pub u8);

impl Lane {
    /// Returns the lane index (0-based).
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single authored drum hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeatMapNote {
    pub drum: DrumKind,
    /// Milliseconds from track start.
    #[serde(rename = "time")]
    pub time_ms: f64,
    #[serde(default)]
    pub lane: Lane,
}

impl BeatMapNote {
    pub fn new(drum: DrumKind, time_ms: f64, lane: Lane) -> Self {
        Self {
            drum,
            time_ms,
            lane,
        }
    }
}

/// Stable identity of a note within one beat map.
///
/// Timestamps are not unique (simultaneous hits on different drums), so the
/// identity is the triple of time, drum and position in the authored list.
#[derive(Debug, Clone, Copy)]
pub struct NoteId {
    pub index: usize,
    pub drum: DrumKind,
    pub time_ms: f64,
}

impl NoteId {
    pub fn of(index: usize, note: &BeatMapNote) -> Self {
        Self {
            index,
            drum: note.drum,
            time_ms: note.time_ms,
        }
    }
}

impl PartialEq for NoteId {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.drum == other.drum
            && self.time_ms.to_bits() == other.time_ms.to_bits()
    }
}

impl Eq for NoteId {}

impl Hash for NoteId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.drum.hash(state);
        self.time_ms.to_bits().hash(state);
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:?}-{}", self.time_ms, self.drum, self.index)
    }
}
