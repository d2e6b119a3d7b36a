//! Play engine: note tracking, hit judgment, scoring and the session loop.

mod autoplay;
mod clock;
mod error;
mod hit_matcher;
mod judge;
mod note_tracker;
mod pulse;
mod score;
mod session;

pub use autoplay::{Autoplay, AutoplayStyle};
pub use clock::SessionClock;
pub use error::EngineError;
pub use hit_matcher::{HitMatcher, HitResult};
pub use judge::{JudgeWindow, JudgeWindowBuilder, Timing, TimingDirection};
pub use note_tracker::{
    MissedNote, NoteState, NoteTracker, PendingNote, RefreshOutcome, VisibleNote,
};
pub use pulse::{BeatPulse, PulseState};
pub use score::{GameStats, MissKind, ScoreTracker};
pub use session::{FrameReport, GameSession, SessionPhase, SessionSummary};
