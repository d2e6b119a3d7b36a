//! Session controller: `Preparing -> Playing -> Complete`.
//!
//! The host calls [`GameSession::on_drum_triggered`] whenever the input layer
//! reports a strike and [`GameSession::on_frame`] once per rendered frame.
//! Inputs are queued and applied in arrival order at the next frame, each one
//! matched at its own timestamp. Misses are decided once per frame, after all
//! queued inputs have been matched.
//!
//! Track time zero is the end of the countdown: a session created at host
//! time `t` with a 3000 ms countdown has `start_time_ms() == t + 3000`.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::config::EngineConfig;
use crate::input::{DrumTrigger, InputQueue};
use crate::model::{BeatMap, DrumKind};
use crate::traits::observer::SessionObserver;

use super::error::EngineError;
use super::hit_matcher::{HitMatcher, HitResult};
use super::note_tracker::{MissedNote, NoteState, NoteTracker, VisibleNote};
use super::pulse::BeatPulse;
use super::score::{GameStats, ScoreTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    /// Countdown; inputs are discarded.
    Preparing,
    Playing,
    Complete,
    /// Exited by the player; nothing is reported.
    Aborted,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Aborted)
    }
}

/// Final result handed to the surrounding application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub title: String,
    pub artist: String,
    pub final_score: u32,
    pub stats: GameStats,
}

/// Everything one frame produced.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub phase: SessionPhase,
    /// Frame time relative to track start (negative during the countdown).
    pub track_time_ms: f64,
    pub visible: Vec<VisibleNote>,
    pub hits: Vec<HitResult>,
    pub misses: Vec<MissedNote>,
    /// Set only on the frame that completes the session.
    pub completed: Option<SessionSummary>,
}

impl FrameReport {
    fn new(phase: SessionPhase, track_time_ms: f64) -> Self {
        Self {
            phase,
            track_time_ms,
            visible: Vec::new(),
            hits: Vec::new(),
            misses: Vec::new(),
            completed: None,
        }
    }

    /// Forward this frame's events: visible notes, hits, misses, completion.
    pub fn dispatch<O: SessionObserver + ?Sized>(&self, observer: &mut O) {
        observer.on_notes_visible(&self.visible);
        for hit in &self.hits {
            observer.on_hit(hit);
        }
        for missed in &self.misses {
            observer.on_miss(&missed.note);
        }
        if let Some(summary) = &self.completed {
            observer.on_session_complete(summary);
        }
    }
}

pub struct GameSession {
    /// Beat map as supplied, before tempo scaling.
    source_map: Arc<BeatMap>,
    beat_map: Arc<BeatMap>,
    config: EngineConfig,
    phase: SessionPhase,
    start_time_ms: f64,
    tracker: NoteTracker,
    matcher: HitMatcher,
    score: ScoreTracker,
    inputs: InputQueue,
    last_frame_ms: Option<f64>,
    summary: Option<SessionSummary>,
}

impl GameSession {
    /// Create a session whose countdown starts at host time `now_ms`.
    pub fn new(
        beat_map: Arc<BeatMap>,
        config: EngineConfig,
        now_ms: f64,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let scaled = scale_map(&beat_map, config.tempo_scale)?;

        Ok(Self {
            tracker: NoteTracker::new(
                Arc::clone(&scaled),
                config.look_ahead_ms,
                config.judge.miss_ms,
            ),
            matcher: HitMatcher::new(config.judge),
            score: ScoreTracker::new(note_total(&scaled)),
            source_map: beat_map,
            beat_map: scaled,
            config,
            phase: SessionPhase::Preparing,
            start_time_ms: now_ms + config.countdown_ms,
            inputs: InputQueue::new(),
            last_frame_ms: None,
            summary: None,
        })
    }

    /// Queue a drum strike for the next frame.
    pub fn on_drum_triggered(&mut self, drum: DrumKind, timestamp_ms: f64) {
        if self.phase.is_terminal() {
            trace!(?drum, "input ignored after session end");
            return;
        }
        self.inputs.push(DrumTrigger::new(drum, timestamp_ms));
    }

    /// Advance the session to host time `now_ms`.
    pub fn on_frame(&mut self, now_ms: f64) -> FrameReport {
        let now = match self.last_frame_ms {
            Some(last) if now_ms < last => {
                warn!(now_ms, last_ms = last, "frame time went backwards; clamped");
                last
            }
            _ => now_ms,
        };
        self.last_frame_ms = Some(now);

        let track_now = now - self.start_time_ms;
        let mut report = FrameReport::new(self.phase, track_now);

        if self.phase.is_terminal() {
            self.inputs.clear();
            return report;
        }

        if self.score.total_notes() == 0 {
            self.inputs.clear();
            self.finish(&mut report);
            return report;
        }

        if self.phase == SessionPhase::Preparing {
            if track_now < 0.0 {
                if !self.inputs.is_empty() {
                    debug!(count = self.inputs.len(), "inputs discarded during countdown");
                    self.inputs.clear();
                }
                return report;
            }
            debug!(track = %self.beat_map.name(), "countdown finished");
            self.phase = SessionPhase::Playing;
            report.phase = self.phase;
        }

        let pending: Vec<DrumTrigger> = self.inputs.drain().collect();
        for trigger in pending {
            self.apply_input(trigger, track_now, &mut report);
        }

        let refreshed = self.tracker.refresh(track_now);
        self.record_misses(refreshed.newly_missed, &mut report);
        report.visible = refreshed.visible;

        if track_now >= self.beat_map.duration_ms() + self.config.grace_period_ms {
            self.finish(&mut report);
        }

        report
    }

    fn apply_input(&mut self, trigger: DrumTrigger, track_now: f64, report: &mut FrameReport) {
        if trigger.timestamp_ms < self.start_time_ms {
            trace!(drum = ?trigger.drum, "input before track start dropped");
            return;
        }
        let time_in_game =
            trigger.timestamp_ms - self.start_time_ms - self.config.latency_offset_ms;

        // Admit only. Eviction happens in the frame refresh.
        self.tracker.admit_until(time_in_game.min(track_now));

        if let Some(hit) = self.matcher.try_hit(
            &mut self.tracker,
            trigger.drum,
            time_in_game,
            trigger.timestamp_ms,
        ) {
            self.score.apply_hit(hit.timing, hit.score, hit.offset_ms);
            report.hits.push(hit);
        }
    }

    fn record_misses(&mut self, missed: Vec<MissedNote>, report: &mut FrameReport) {
        for note in missed {
            self.score.apply_timeout();
            report.misses.push(note);
        }
    }

    fn finish(&mut self, report: &mut FrameReport) {
        let leftover = self.tracker.flush_unresolved();
        self.record_misses(leftover, report);

        let stats = self.score.snapshot();
        let summary = SessionSummary {
            title: self.beat_map.name().to_string(),
            artist: self.beat_map.artist().to_string(),
            final_score: stats.score,
            stats,
        };
        info!(
            track = %summary.title,
            score = summary.final_score,
            max_combo = summary.stats.max_combo,
            accuracy = summary.stats.accuracy,
            "session complete"
        );

        self.phase = SessionPhase::Complete;
        report.phase = self.phase;
        report.completed = Some(summary.clone());
        self.summary = Some(summary);
    }

    /// Stop the session and drop all working state. Nothing further is reported.
    pub fn abort(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        debug!(phase = ?self.phase, "session aborted");
        self.phase = SessionPhase::Aborted;
        self.tracker.clear();
        self.inputs.clear();
    }

    /// Re-enter the countdown at host time `now_ms` with zeroed state.
    pub fn restart(&mut self, now_ms: f64) {
        self.reset_state();
        self.phase = SessionPhase::Preparing;
        self.start_time_ms = now_ms + self.config.countdown_ms;
        self.last_frame_ms = None;
        self.summary = None;
        debug!(track = %self.beat_map.name(), "session restarted");
    }

    /// Swap the beat map and restart the countdown at host time `now_ms`.
    /// Not allowed while `Playing`.
    pub fn set_beat_map(
        &mut self,
        beat_map: Arc<BeatMap>,
        now_ms: f64,
    ) -> Result<(), EngineError> {
        self.ensure_not_playing()?;
        self.beat_map = scale_map(&beat_map, self.config.tempo_scale)?;
        self.source_map = beat_map;
        self.restart(now_ms);
        Ok(())
    }

    /// Change the tempo multiplier and restart the countdown at host time
    /// `now_ms`. Not allowed while `Playing`.
    pub fn set_tempo_scale(
        &mut self,
        tempo_scale: f64,
        now_ms: f64,
    ) -> Result<(), EngineError> {
        self.ensure_not_playing()?;
        let config = EngineConfig {
            tempo_scale,
            ..self.config
        };
        config.validate()?;
        self.beat_map = scale_map(&self.source_map, tempo_scale)?;
        self.config = config;
        self.restart(now_ms);
        Ok(())
    }

    fn ensure_not_playing(&self) -> Result<(), EngineError> {
        if self.phase == SessionPhase::Playing {
            return Err(EngineError::SessionInProgress(self.phase));
        }
        Ok(())
    }

    fn reset_state(&mut self) {
        self.tracker = NoteTracker::new(
            Arc::clone(&self.beat_map),
            self.config.look_ahead_ms,
            self.config.judge.miss_ms,
        );
        self.score = ScoreTracker::new(note_total(&self.beat_map));
        self.inputs.clear();
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Host time at which track time is zero.
    pub fn start_time_ms(&self) -> f64 {
        self.start_time_ms
    }

    /// Beat map in play (after tempo scaling).
    pub fn beat_map(&self) -> &BeatMap {
        &self.beat_map
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> GameStats {
        self.score.snapshot()
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn note_state(&self, index: usize) -> Option<NoteState> {
        self.tracker.state(index)
    }

    /// Track completion in percent, clamped to `0..=100`.
    pub fn progress_percent(&self, now_ms: f64) -> f64 {
        let duration = self.beat_map.duration_ms();
        if duration <= 0.0 {
            return 100.0;
        }
        ((now_ms - self.start_time_ms) / duration * 100.0).clamp(0.0, 100.0)
    }

    /// Whole seconds left on the countdown, if it is still running.
    pub fn countdown_seconds(&self, now_ms: f64) -> Option<u32> {
        if self.phase != SessionPhase::Preparing {
            return None;
        }
        let remaining = self.start_time_ms - now_ms;
        (remaining > 0.0).then(|| (remaining / 1000.0).ceil() as u32)
    }

    pub fn beat_pulse(&self) -> BeatPulse {
        BeatPulse::new(self.beat_map.bpm())
    }
}

fn scale_map(beat_map: &Arc<BeatMap>, tempo_scale: f64) -> Result<Arc<BeatMap>, EngineError> {
    if (tempo_scale - 1.0).abs() < f64::EPSILON {
        return Ok(Arc::clone(beat_map));
    }
    Ok(Arc::new(beat_map.scaled(tempo_scale)?))
}

fn note_total(beat_map: &BeatMap) -> u32 {
    u32::try_from(beat_map.note_count()).unwrap_or(u32::MAX)
}
