//! Built-in practice tracks.
//!
//! Every track is four bars of eight eighth notes at 50 bpm, preceded by
//! three seconds of silence. Lane 0 carries the kick, lane 1 the hi-hat and
//! lane 2 the snare.

use super::beat_map::BeatMap;
use super::drum::DrumKind;
use super::error::BeatMapError;
use super::note::{BeatMapNote, Lane};

const ARTIST: &str = "Virtual Drums";
const BPM: f64 = 50.0;
const DURATION_MS: f64 = 25_000.0;
const FIRST_NOTE_MS: f64 = 3000.0;
const EIGHTH_MS: f64 = 600.0;
const BARS: usize = 4;

/// One bar: the drums struck on each of the eight eighth notes.
type BarPattern = [&'static [DrumKind]; 8];

use DrumKind::{ClosedHiHat as Hh, Kick, OpenHiHat as Ohh, Snare};

const BASIC_ROCK: BarPattern = [
    &[Kick, Hh],
    &[Hh],
    &[Snare, Hh],
    &[Kick, Hh],
    &[Kick, Hh],
    &[Hh],
    &[Snare, Hh],
    &[Hh],
];

const COUNTRY_ROCK: BarPattern = [
    &[Kick, Hh],
    &[Snare, Hh],
    &[Kick, Hh],
    &[Snare, Hh],
    &[Kick, Hh],
    &[Snare, Hh],
    &[Kick, Hh],
    &[Snare, Hh],
];

const HEAVY_ROCK: BarPattern = [
    &[Kick, Ohh],
    &[Ohh],
    &[Snare, Ohh],
    &[Ohh],
    &[Kick, Ohh],
    &[Kick, Ohh],
    &[Snare, Ohh],
    &[Ohh],
];

/// A catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct TrackInfo {
    pub id: &'static str,
    pub name: &'static str,
    pattern: &'static BarPattern,
}

pub const TRACKS: &[TrackInfo] = &[
    TrackInfo {
        id: "basic-rock",
        name: "Basic Rock",
        pattern: &BASIC_ROCK,
    },
    TrackInfo {
        id: "country-rock",
        name: "Country Rock",
        pattern: &COUNTRY_ROCK,
    },
    TrackInfo {
        id: "heavy-rock",
        name: "Heavy Rock",
        pattern: &HEAVY_ROCK,
    },
];

impl TrackInfo {
    /// Build the beat map for this track.
    pub fn beat_map(&self) -> Result<BeatMap, BeatMapError> {
        let mut notes = Vec::new();
        for bar in 0..BARS {
            for (step, drums) in self.pattern.iter().enumerate() {
                let time_ms = FIRST_NOTE_MS + ((bar * 8 + step) as f64) * EIGHTH_MS;
                for &drum in drums.iter() {
                    notes.push(BeatMapNote::new(drum, time_ms, lane_for(drum)));
                }
            }
        }
        BeatMap::new(self.name, ARTIST, BPM, DURATION_MS, notes)
    }
}

/// Fixed lane assignment used by the built-in tracks.
pub fn lane_for(drum: DrumKind) -> Lane {
    match drum {
        DrumKind::Kick => Lane(0),
        DrumKind::ClosedHiHat | DrumKind::OpenHiHat => Lane(1),
        DrumKind::Snare => Lane(2),
        DrumKind::HighTom | DrumKind::MidTom => Lane(3),
        DrumKind::FloorTom => Lane(4),
        DrumKind::Crash | DrumKind::Ride => Lane(5),
    }
}

/// Look up a built-in track by id.
pub fn find(id: &str) -> Option<&'static TrackInfo> {
    TRACKS.iter().find(|t| t.id == id)
}

/// Build the beat map of a built-in track by id.
pub fn load(id: &str) -> Result<BeatMap, BeatMapError> {
    find(id)
        .ok_or_else(|| BeatMapError::UnknownTrack(id.to_string()))?
        .beat_map()
}
