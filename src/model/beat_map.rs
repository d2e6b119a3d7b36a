use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::BeatMapError;
use super::note::BeatMapNote;

/// Immutable description of one playable track.
///
/// Notes keep their authored order; they need not be sorted by time and
/// several notes may share a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BeatMapData")]
pub struct BeatMap {
    name: String,
    artist: String,
    bpm: f64,
    #[serde(rename = "duration")]
    duration_ms: f64,
    notes: Vec<BeatMapNote>,
}

/// Unvalidated wire shape of a beat map file.
#[derive(Deserialize)]
struct BeatMapData {
    #[serde(default)]
    name: String,
    #[serde(default)]
    artist: String,
    bpm: f64,
    duration: f64,
    #[serde(default)]
    notes: Vec<BeatMapNote>,
}

impl TryFrom<BeatMapData> for BeatMap {
    type Error = BeatMapError;

    fn try_from(data: BeatMapData) -> Result<Self, Self::Error> {
        BeatMap::new(data.name, data.artist, data.bpm, data.duration, data.notes)
    }
}

impl BeatMap {
    /// Build a validated beat map.
    ///
    /// Rejects a non-positive tempo, a negative duration and any note whose
    /// time falls outside `0..=duration`. An empty note list is accepted.
    pub fn new(
        name: impl Into<String>,
        artist: impl Into<String>,
        bpm: f64,
        duration_ms: f64,
        notes: Vec<BeatMapNote>,
    ) -> Result<Self, BeatMapError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(BeatMapError::InvalidTempo(bpm));
        }
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            return Err(BeatMapError::InvalidDuration(duration_ms));
        }
        for (index, note) in notes.iter().enumerate() {
            if !note.time_ms.is_finite() || note.time_ms < 0.0 || note.time_ms > duration_ms {
                return Err(BeatMapError::NoteOutOfRange {
                    index,
                    time_ms: note.time_ms,
                    duration_ms,
                });
            }
        }

        Ok(Self {
            name: name.into(),
            artist: artist.into(),
            bpm,
            duration_ms,
            notes,
        })
    }

    /// Parse and validate a beat map from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, BeatMapError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load and validate a beat map from a JSON file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, BeatMapError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| BeatMapError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Produce a copy of this map re-timed for a different tempo.
    ///
    /// Note times and the duration are both scaled by `bpm / new_bpm`.
    /// Scaled note times are clamped to the scaled duration so rounding can
    /// never push the last note past the end of the track.
    pub fn with_tempo(&self, new_bpm: f64) -> Result<Self, BeatMapError> {
        if !new_bpm.is_finite() || new_bpm <= 0.0 {
            return Err(BeatMapError::InvalidTempo(new_bpm));
        }
        let ratio = self.bpm / new_bpm;
        let duration_ms = self.duration_ms * ratio;
        let notes = self
            .notes
            .iter()
            .map(|note| BeatMapNote {
                time_ms: (note.time_ms * ratio).min(duration_ms),
                ..*note
            })
            .collect();

        debug!(
            track = %self.name,
            from_bpm = self.bpm,
            to_bpm = new_bpm,
            "rescaled beat map"
        );
        Self::new(
            self.name.clone(),
            self.artist.clone(),
            new_bpm,
            duration_ms,
            notes,
        )
    }

    /// Re-time by a tempo multiplier (`2.0` plays twice as fast).
    pub fn scaled(&self, tempo_scale: f64) -> Result<Self, BeatMapError> {
        self.with_tempo(self.bpm * tempo_scale)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn notes(&self) -> &[BeatMapNote] {
        &self.notes
    }

    pub fn note(&self, index: usize) -> Option<&BeatMapNote> {
        self.notes.get(index)
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Time of the latest note, if any.
    pub fn last_note_time_ms(&self) -> Option<f64> {
        self.notes.iter().map(|n| n.time_ms).reduce(f64::max)
    }
}
