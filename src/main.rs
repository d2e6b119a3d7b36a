use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use virtual_drums::config::{EngineConfig, PlayerSettings};
use virtual_drums::model::{BeatMap, BeatMapNote, catalog};
use virtual_drums::play::{Autoplay, AutoplayStyle, GameSession, HitResult, SessionClock};
use virtual_drums::traits::input::DrumInputSource;
use virtual_drums::traits::observer::SessionObserver;
use virtual_drums::traits::time::{MockTimeProvider, TimeProvider};
use virtual_drums::util::logging::init_logging;

/// Frames simulated past the expected end before giving up.
const MAX_EXTRA_FRAMES: u32 = 10_000;

#[derive(Parser)]
#[command(name = "virtual-drums", version, about = "Headless drum-track player")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to this directory
    #[arg(long, global = true, env = "VIRTUAL_DRUMS_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the built-in tracks
    List,
    /// Autoplay a track and print the session summary as JSON
    Play(PlayArgs),
}

#[derive(Args)]
struct PlayArgs {
    /// Built-in track id (default: basic-rock)
    #[arg(long, conflicts_with = "beat_map")]
    track: Option<String>,

    /// Beat map JSON file
    #[arg(long)]
    beat_map: Option<PathBuf>,

    /// Retime the track to this tempo
    #[arg(long)]
    bpm: Option<f64>,

    /// Engine config JSON (defaults to the player's settings)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Constant strike offset in ms (negative = early)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    offset_ms: f64,

    /// Random strike spread in ms
    #[arg(long, default_value_t = 0.0)]
    jitter_ms: f64,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Simulated frame interval in ms
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f64,
}

/// Writes frame events to the log.
struct LogObserver;

impl SessionObserver for LogObserver {
    fn on_hit(&mut self, hit: &HitResult) {
        debug!(
            drum = %hit.drum,
            timing = ?hit.timing,
            offset_ms = hit.offset_ms,
            "hit"
        );
    }

    fn on_miss(&mut self, note: &BeatMapNote) {
        debug!(drum = %note.drum, time_ms = note.time_ms, "miss");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_dir.as_deref(), cli.verbose)?;

    match cli.command {
        Command::List => list_tracks(),
        Command::Play(args) => play(args),
    }
}

fn list_tracks() -> Result<()> {
    for track in catalog::TRACKS {
        let beat_map = track.beat_map()?;
        println!(
            "{:<14} {:<14} {:>4} notes  {} bpm",
            track.id,
            track.name,
            beat_map.note_count(),
            beat_map.bpm()
        );
    }
    Ok(())
}

fn load_beat_map(args: &PlayArgs) -> Result<BeatMap> {
    let beat_map = match &args.beat_map {
        Some(path) => BeatMap::load_from(path)?,
        None => catalog::load(args.track.as_deref().unwrap_or("basic-rock"))?,
    };
    match args.bpm {
        Some(bpm) => Ok(beat_map.with_tempo(bpm)?),
        None => Ok(beat_map),
    }
}

fn play(args: PlayArgs) -> Result<()> {
    if !args.frame_ms.is_finite() || args.frame_ms <= 0.0 {
        bail!("--frame-ms must be positive, got {}", args.frame_ms);
    }

    let config = match &args.config {
        Some(path) => EngineConfig::load_from(path)
            .with_context(|| format!("failed to load engine config {}", path.display()))?,
        None => PlayerSettings::load().engine_config(),
    };
    let beat_map = Arc::new(load_beat_map(&args)?);
    info!(
        track = beat_map.name(),
        notes = beat_map.note_count(),
        bpm = beat_map.bpm(),
        "starting autoplay"
    );

    let provider = MockTimeProvider::new();
    let mut clock = SessionClock::start(&provider);
    let mut session = GameSession::new(beat_map, config, clock.sample())?;
    let mut autoplay = Autoplay::new(
        &session,
        AutoplayStyle {
            offset_ms: args.offset_ms,
            jitter_ms: args.jitter_ms,
            seed: args.seed,
        },
    );

    let end_ms = session.start_time_ms()
        + session.beat_map().duration_ms()
        + session.config().grace_period_ms;
    let frame_limit = (end_ms / args.frame_ms).ceil() as u64 + u64::from(MAX_EXTRA_FRAMES);

    let mut observer = LogObserver;
    for _ in 0..frame_limit {
        provider.advance(args.frame_ms);
        let now = clock.sample();
        for trigger in autoplay.poll_triggers(now) {
            session.on_drum_triggered(trigger.drum, trigger.timestamp_ms);
        }
        let report = session.on_frame(now);
        report.dispatch(&mut observer);

        if let Some(summary) = report.completed {
            debug!(now_ms = provider.now_ms(), "session finished");
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }
    }

    bail!("session did not complete within {frame_limit} frames")
}
