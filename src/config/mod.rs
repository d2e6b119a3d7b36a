//! Engine and player configuration.

mod engine_config;
mod settings;

pub use engine_config::EngineConfig;
pub use settings::{AudioPrefs, PlayerSettings};
