use tracing::{trace, warn};

use crate::config::AudioPrefs;
use crate::model::DrumKind;
use crate::play::GameSession;
use crate::traits::audio::DrumSampler;

use super::key_bindings::KeyBindings;

/// A key press as reported by the host's keyboard layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawKeyEvent {
    pub key: String,
    pub timestamp_ms: f64,
    /// OS auto-repeat while the key is held.
    pub repeat: bool,
}

impl RawKeyEvent {
    pub fn press(key: impl Into<String>, timestamp_ms: f64) -> Self {
        Self {
            key: key.into(),
            timestamp_ms,
            repeat: false,
        }
    }
}

/// Turns key presses and pad clicks into drum triggers.
///
/// Every trigger plays the drum's sample (subject to mute/solo) and, when a
/// session is running, is forwarded to it.
pub struct InputRouter<S: DrumSampler> {
    bindings: KeyBindings,
    audio: AudioPrefs,
    sampler: S,
}

impl<S: DrumSampler> InputRouter<S> {
    pub fn new(bindings: KeyBindings, audio: AudioPrefs, sampler: S) -> Self {
        Self {
            bindings,
            audio,
            sampler,
        }
    }

    /// Route a key press. Returns the drum it triggered, if any.
    pub fn handle_key(
        &mut self,
        event: &RawKeyEvent,
        session: Option<&mut GameSession>,
    ) -> Option<DrumKind> {
        if event.repeat {
            return None;
        }
        let drum = self.bindings.drum_for_key(&event.key)?;
        self.trigger_drum(drum, event.timestamp_ms, session);
        Some(drum)
    }

    /// Trigger a drum directly, e.g. from a click on its pad.
    pub fn trigger_drum(
        &mut self,
        drum: DrumKind,
        timestamp_ms: f64,
        session: Option<&mut GameSession>,
    ) {
        match self.audio.effective_volume(drum) {
            Some(volume) => {
                if let Err(e) = self.sampler.play(drum, volume) {
                    warn!(?drum, "failed to play drum sample: {e}");
                }
            }
            None => trace!(?drum, "drum silenced"),
        }
        if let Some(session) = session {
            session.on_drum_triggered(drum, timestamp_ms);
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    pub fn audio(&self) -> &AudioPrefs {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioPrefs {
        &mut self.audio
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }
}
