use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BeatMapError {
    #[error("Failed to read beat map file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse beat map: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Tempo must be a positive number of beats per minute, got {0}")]
    InvalidTempo(f64),

    #[error("Duration must be a non-negative number of milliseconds, got {0}")]
    InvalidDuration(f64),

    #[error("Note {index} at {time_ms}ms lies outside the track (0..={duration_ms}ms)")]
    NoteOutOfRange {
        index: usize,
        time_ms: f64,
        duration_ms: f64,
    },

    #[error("Unknown track: {0}")]
    UnknownTrack(String),
}
