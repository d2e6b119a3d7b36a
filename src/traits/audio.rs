use anyhow::Result;

use crate::model::DrumKind;

/// Abstraction over drum sample playback.
/// Implementations: the host's audio engine, MockSampler (testing/headless).
pub trait DrumSampler {
    /// Play one hit of `drum` at `volume` (0.0..=1.0).
    fn play(&mut self, drum: DrumKind, volume: f32) -> Result<()>;
}

/// Sampler that only records what it was asked to play.
#[derive(Debug, Default)]
pub struct MockSampler {
    pub played: Vec<(DrumKind, f32)>,
}

impl MockSampler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DrumSampler for MockSampler {
    fn play(&mut self, drum: DrumKind, volume: f32) -> Result<()> {
        self.played.push((drum, volume));
        Ok(())
    }
}
