// Data models for beat maps and the drum kit.

pub mod beat_map;
pub mod catalog;
pub mod drum;
pub mod error;
pub mod note;

pub use beat_map::BeatMap;
pub use drum::{DRUM_COUNT, DrumKind};
pub use error::BeatMapError;
pub use note::{BeatMapNote, Lane, NoteId};
