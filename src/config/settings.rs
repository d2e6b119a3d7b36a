use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::input::KeyBindings;
use crate::model::DrumKind;

use super::engine_config::EngineConfig;

/// Playback preferences for drum samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioPrefs {
    volume: f32,
    pub muted: bool,
    /// When set, only this drum is audible.
    pub solo: Option<DrumKind>,
}

impl Default for AudioPrefs {
    fn default() -> Self {
        Self {
            volume: 0.8,
            muted: false,
            solo: None,
        }
    }
}

impl AudioPrefs {
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Set master volume, clamped to 0.0..=1.0.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Toggle solo on `drum`; soloing the already-soloed drum clears it.
    pub fn toggle_solo(&mut self, drum: DrumKind) {
        self.solo = if self.solo == Some(drum) {
            None
        } else {
            Some(drum)
        };
    }

    /// Volume to play `drum` at, or `None` if it is silenced.
    pub fn effective_volume(&self, drum: DrumKind) -> Option<f32> {
        if self.muted || self.solo.is_some_and(|solo| solo != drum) {
            return None;
        }
        Some(self.volume)
    }
}

/// Per-player settings persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub key_bindings: KeyBindings,
    pub audio: AudioPrefs,
    /// Engine timing, including this player's input latency offset.
    pub engine: EngineConfig,
}

impl PlayerSettings {
    /// Load settings from disk
    pub fn load() -> Self {
        Self::settings_path()
            .and_then(Self::load_from)
            .unwrap_or_default()
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&content)?;
        settings.key_bindings.normalize();
        settings.audio.set_volume(settings.audio.volume);
        settings.engine.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::settings_path()?)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        self.engine
    }

    /// Input latency compensation applied to every session.
    pub fn latency_offset_ms(&self) -> f64 {
        self.engine.latency_offset_ms
    }

    pub fn set_latency_offset_ms(&mut self, offset_ms: f64) {
        self.engine.latency_offset_ms = offset_ms;
    }

    fn settings_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("com", "virtual-drums", "virtual-drums") {
            Ok(proj_dirs.config_dir().join("settings.json"))
        } else {
            Ok(PathBuf::from(".virtual-drums-settings.json"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn volume_is_clamped() {
        let mut audio = AudioPrefs::default();
        audio.set_volume(1.7);
        assert!((audio.volume() - 1.0).abs() < f32::EPSILON);
        audio.set_volume(-0.2);
        assert!((audio.volume() - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn mute_and_solo_silence_drums() {
        let mut audio = AudioPrefs::default();
        assert_eq!(audio.effective_volume(DrumKind::Kick), Some(0.8));

        audio.toggle_solo(DrumKind::Snare);
        assert_eq!(audio.effective_volume(DrumKind::Kick), None);
        assert_eq!(audio.effective_volume(DrumKind::Snare), Some(0.8));

        audio.toggle_solo(DrumKind::Snare);
        assert_eq!(audio.solo, None);

        audio.toggle_mute();
        assert_eq!(audio.effective_volume(DrumKind::Snare), None);
    }

    #[test]
    fn engine_config_carries_latency() {
        let mut settings = PlayerSettings::default();
        settings.set_latency_offset_ms(25.0);
        let config = settings.engine_config();
        assert!((config.latency_offset_ms - 25.0).abs() < f64::EPSILON);
        assert!((config.look_ahead_ms - 3000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = PlayerSettings::default();
        settings.key_bindings.set(DrumKind::Ride, "o");
        settings.audio.set_volume(0.5);
        settings.set_latency_offset_ms(-10.0);
        settings.save_to(&path).unwrap();

        assert_eq!(PlayerSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn latency_is_read_from_engine_block() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "engine": { "latency_offset_ms": 35 } }"#).unwrap();

        let settings = PlayerSettings::load_from(&path).unwrap();
        assert!((settings.latency_offset_ms() - 35.0).abs() < f64::EPSILON);
        assert!((settings.engine_config().latency_offset_ms - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_volume_in_file_is_clamped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "audio": { "volume": 4.0 } }"#).unwrap();

        let settings = PlayerSettings::load_from(&path).unwrap();
        assert!((settings.audio.volume() - 1.0).abs() < f32::EPSILON);
        assert_eq!(settings.key_bindings, KeyBindings::default());
    }
}
