use crate::input::DrumTrigger;

/// Abstraction over drum input sources.
/// Implementations: InputRouter-fed host loops, Autoplay (scripted testing).
pub trait DrumInputSource {
    /// Triggers whose timestamp is at or before `now_ms`, oldest first.
    fn poll_triggers(&mut self, now_ms: f64) -> Vec<DrumTrigger>;

    /// True once the source will produce no further triggers.
    fn is_exhausted(&self) -> bool;
}
