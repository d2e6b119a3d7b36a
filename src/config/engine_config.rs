use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::play::{EngineError, JudgeWindow};

/// Fixed per-session timing parameters of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How far ahead of its hit time a note becomes visible.
    pub look_ahead_ms: f64,
    pub judge: JudgeWindow,
    /// Countdown before the track clock starts.
    pub countdown_ms: f64,
    /// Time after the track's nominal duration before the session ends.
    pub grace_period_ms: f64,
    /// Tempo multiplier applied to the beat map at session start.
    pub tempo_scale: f64,
    /// Subtracted from every input timestamp (positive = inputs arrive late).
    pub latency_offset_ms: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            look_ahead_ms: 3000.0,
            judge: JudgeWindow::normal(),
            countdown_ms: 3000.0,
            grace_period_ms: 2000.0,
            tempo_scale: 1.0,
            latency_offset_ms: 0.0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        let non_negative = [
            ("look_ahead_ms", self.look_ahead_ms),
            ("countdown_ms", self.countdown_ms),
            ("grace_period_ms", self.grace_period_ms),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if !self.judge.is_valid() {
            return Err(EngineError::InvalidConfig(format!(
                "judge windows must satisfy 0 <= perfect <= good <= miss, got {:?}",
                self.judge
            )));
        }
        if self.look_ahead_ms < self.judge.miss_ms {
            return Err(EngineError::InvalidConfig(format!(
                "look_ahead_ms ({}) must not be shorter than the miss window ({})",
                self.look_ahead_ms, self.judge.miss_ms
            )));
        }
        if !self.tempo_scale.is_finite() || self.tempo_scale <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "tempo_scale must be positive, got {}",
                self.tempo_scale
            )));
        }
        if !self.latency_offset_ms.is_finite() {
            return Err(EngineError::InvalidConfig(
                "latency_offset_ms must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads config from a specified path.
    /// Returns default config if file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves config to a specified path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
