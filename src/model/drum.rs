use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of drums in the kit.
pub const DRUM_COUNT: usize = 9;

/// Identifies one drum of the kit.
///
/// Serialized in camelCase (`closedHiHat`) so beat maps authored for the
/// browser game load unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DrumKind {
    Kick,
    Snare,
    HighTom,
    MidTom,
    FloorTom,
    ClosedHiHat,
    OpenHiHat,
    Crash,
    Ride,
}

impl DrumKind {
    /// Returns all drums in kit order.
    pub fn all() -> &'static [DrumKind] {
        &[
            DrumKind::Kick,
            DrumKind::Snare,
            DrumKind::HighTom,
            DrumKind::MidTom,
            DrumKind::FloorTom,
            DrumKind::ClosedHiHat,
            DrumKind::OpenHiHat,
            DrumKind::Crash,
            DrumKind::Ride,
        ]
    }

    /// Returns the drum index (0-based, kit order).
    pub fn index(self) -> usize {
        match self {
            DrumKind::Kick => 0,
            DrumKind::Snare => 1,
            DrumKind::HighTom => 2,
            DrumKind::MidTom => 3,
            DrumKind::FloorTom => 4,
            DrumKind::ClosedHiHat => 5,
            DrumKind::OpenHiHat => 6,
            DrumKind::Crash => 7,
            DrumKind::Ride => 8,
        }
    }

    /// Create a drum from a 0-based kit index.
    pub fn from_index(index: usize) -> Option<DrumKind> {
        Self::all().get(index).copied()
    }

    /// Human-readable name shown on pads and in results.
    pub fn label(self) -> &'static str {
        match self {
            DrumKind::Kick => "Kick",
            DrumKind::Snare => "Snare",
            DrumKind::HighTom => "High Tom",
            DrumKind::MidTom => "Mid Tom",
            DrumKind::FloorTom => "Floor Tom",
            DrumKind::ClosedHiHat => "Closed Hi-Hat",
            DrumKind::OpenHiHat => "Open Hi-Hat",
            DrumKind::Crash => "Crash Cymbal",
            DrumKind::Ride => "Ride Cymbal",
        }
    }

    /// Default keyboard key for this drum.
    pub fn default_key(self) -> char {
        match self {
            DrumKind::Kick => 'f',
            DrumKind::Snare => 'j',
            DrumKind::HighTom => 'r',
            DrumKind::MidTom => 't',
            DrumKind::FloorTom => 'g',
            DrumKind::ClosedHiHat => 'h',
            DrumKind::OpenHiHat => 'y',
            DrumKind::Crash => 'u',
            DrumKind::Ride => 'k',
        }
    }

    /// Returns true for cymbals and hi-hats.
    pub fn is_cymbal(self) -> bool {
        matches!(
            self,
            DrumKind::ClosedHiHat | DrumKind::OpenHiHat | DrumKind::Crash | DrumKind::Ride
        )
    }
}

impl fmt::Display for DrumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        for &drum in DrumKind::all() {
            assert_eq!(DrumKind::from_index(drum.index()), Some(drum));
        }
        assert_eq!(DrumKind::from_index(DRUM_COUNT), None);
    }

    #[test]
    fn default_keys_are_unique() {
        let mut keys: Vec<char> = DrumKind::all().iter().map(|d| d.default_key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), DRUM_COUNT);
    }

    #[test]
    fn serde_uses_camel_case() {
        let json = serde_json::to_string(&DrumKind::ClosedHiHat).unwrap();
        assert_eq!(json, "\"closedHiHat\"");
        let drum: DrumKind = serde_json::from_str("\"floorTom\"").unwrap();
        assert_eq!(drum, DrumKind::FloorTom);
    }
}
