//! Command-line runner
//!
//! ```bash
//! # Track simulated hands, printing one JSON snapshot per tick
//! handrig run --ticks 120 --json
//!
//! # Play back a recording
//! handrig replay frames.jsonl
//!
//! # Write a simulated recording
//! handrig record frames.jsonl --ticks 300
//!
//! # Show the effective configuration
//! handrig config
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use handrig_config::{HandrigConfig, SourceKind};
use handrig_core::{
    HandId, HandTracker, HandsSnapshot, MemoryScene, ReplaySource, SensorError, SensorFrame,
    SensorSource, SimulatedSource, TrackerStats,
};

/// Hand-tracking rig driver
#[derive(Parser, Debug)]
#[command(name = "handrig")]
#[command(author, version, about = "Drive a rigged hand model from sensor frames")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file to use instead of the discovered one
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Track hands from the configured source
    Run(RunArgs),

    /// Track hands from a JSON-lines recording
    Replay {
        file: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Write simulated frames to a JSON-lines recording
    Record {
        file: PathBuf,

        /// Number of frames to write
        #[arg(long, default_value_t = 300)]
        ticks: u64,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Stop after this many ticks
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Print every snapshot to stdout as a JSON line
    #[arg(long)]
    pub json: bool,

    /// Override the tick interval in milliseconds
    #[arg(long)]
    pub tick_rate_ms: Option<u64>,
}

/// Load the explicit config file, or discover one
pub fn load_config(path: Option<&PathBuf>) -> Result<(HandrigConfig, Option<PathBuf>)> {
    match path {
        Some(path) => {
            let config = HandrigConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            Ok((config, Some(path.clone())))
        }
        None => HandrigConfig::discover().context("Failed to discover config"),
    }
}

pub async fn execute(command: Commands, config: HandrigConfig, origin: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Run(args) => match config.sensor.source {
            SourceKind::Simulated => {
                let source = SimulatedSource::new(config.simulation_settings());
                drive(source, &config, &args).await?;
            }
            SourceKind::Replay => {
                // validate() guarantees the path for replay sources
                let path = config
                    .sensor
                    .replay_path
                    .clone()
                    .context("sensor.replay_path is not set")?;
                let source = open_replay(&path)?;
                drive(source, &config, &args).await?;
            }
        },
        Commands::Replay { file, run } => {
            let source = open_replay(&file)?;
            drive(source, &config, &run).await?;
        }
        Commands::Record { file, ticks } => {
            let mut source = SimulatedSource::new(config.simulation_settings());
            let frames = (0..ticks)
                .map(|_| source.latest_frame())
                .collect::<Result<Vec<SensorFrame>, _>>()?;
            ReplaySource::record(&file, &frames)
                .with_context(|| format!("Failed to write {}", file.display()))?;
            info!(frames = frames.len(), path = %file.display(), "Recorded frames");
        }
        Commands::Config => {
            println!("# {}", describe_origin(origin.as_deref()));
            print!("{}", config.to_toml_string()?);
        }
    }
    Ok(())
}

/// Where the effective configuration came from, for logs and `handrig config`
pub fn describe_origin(origin: Option<&Path>) -> String {
    match origin {
        Some(path) => format!("Loaded from {}", path.display()),
        None => "Defaults (no config file found)".to_string(),
    }
}

fn open_replay(path: &PathBuf) -> Result<ReplaySource> {
    ReplaySource::open(path).with_context(|| format!("Failed to open recording {}", path.display()))
}

/// Tick a tracker against `source` until it runs dry, the tick limit is hit
/// or the process is interrupted
pub async fn drive<Src: SensorSource>(
    mut source: Src,
    config: &HandrigConfig,
    args: &RunArgs,
) -> Result<TrackerStats> {
    let mut tracker = HandTracker::new(config.tracker_config(), MemoryScene::new());
    let watcher = tokio::spawn(watch_hands(tracker.subscribe()));

    let rate = args.tick_rate_ms.unwrap_or(config.sensor.tick_rate_ms).max(1);
    let mut interval = tokio::time::interval(Duration::from_millis(rate));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        capacity = config.tracker.capacity,
        tick_rate_ms = rate,
        "Tracking started"
    );

    let mut failure = None;
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut shutdown => {
                info!("Interrupted");
                break;
            }
        }

        match tracker.poll(&mut source) {
            Ok(_) => {}
            Err(e @ SensorError::Io { .. }) => {
                failure = Some(e);
                break;
            }
            // A bad frame costs one tick; the tracker keeps its previous state
            Err(e) => {
                warn!(error = %e, "Skipping unreadable frame");
                continue;
            }
        }

        if args.json {
            println!("{}", serde_json::to_string(&*tracker.snapshot())?);
        }
        if source.is_exhausted() {
            debug!("Source exhausted");
            break;
        }
        if args.ticks.is_some_and(|limit| tracker.tick_count() >= limit) {
            break;
        }
    }

    tracker.clear();
    let stats = tracker.stats();
    // Dropping the tracker closes the channel and ends the watcher
    drop(tracker);
    if let Err(e) = watcher.await {
        warn!(error = %e, "Snapshot watcher failed");
    }

    info!(
        ticks = stats.ticks,
        added = stats.added,
        removed = stats.removed,
        dropped = stats.dropped,
        "Tracking finished"
    );

    match failure {
        Some(e) => Err(e).context("Sensor source failed"),
        None => Ok(stats),
    }
}

/// Log hands entering and leaving view as snapshots arrive
async fn watch_hands(mut rx: watch::Receiver<Arc<HandsSnapshot>>) {
    let mut present: Vec<HandId> = Vec::new();

    while rx.changed().await.is_ok() {
        let snapshot = rx.borrow_and_update().clone();
        let current: Vec<HandId> = snapshot.hands.iter().map(|h| h.id).collect();

        for hand in snapshot.hands.iter().filter(|h| !present.contains(&h.id)) {
            info!(
                hand = %hand.id,
                slot = hand.slot,
                handedness = hand.handedness.as_str(),
                tick = snapshot.tick,
                "Hand tracked"
            );
        }
        for id in present.iter().filter(|id| !current.contains(id)) {
            info!(hand = %id, tick = snapshot.tick, "Hand lost");
        }
        present = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handrig_core::{Handedness, InteractionBox, Point3D, SensorHand};

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["handrig", "replay", "frames.jsonl", "--ticks", "5", "--json"]).unwrap();
        match cli.command {
            Commands::Replay { file, run } => {
                assert_eq!(file, PathBuf::from("frames.jsonl"));
                assert_eq!(run.ticks, Some(5));
                assert!(run.json);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from(["handrig", "config", "--config", "custom.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Commands::Config));
    }

    #[test]
    fn test_describe_origin() {
        let path = PathBuf::from("/etc/handrig/config.toml");
        assert_eq!(describe_origin(Some(path.as_path())), "Loaded from /etc/handrig/config.toml");
        assert_eq!(describe_origin(None), "Defaults (no config file found)");
    }

    #[tokio::test]
    async fn test_drive_replay_to_exhaustion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.jsonl");
        let hand = SensorHand::new(HandId(3), Handedness::Left, Point3D::new(0.0, 200.0, 0.0));
        let frames: Vec<SensorFrame> = (1..=4)
            .map(|id| SensorFrame::new(id, InteractionBox::default(), vec![hand.clone()]))
            .collect();
        ReplaySource::record(&path, &frames).unwrap();

        let args = RunArgs {
            tick_rate_ms: Some(1),
            ..RunArgs::default()
        };
        let stats = drive(ReplaySource::open(&path).unwrap(), &HandrigConfig::default(), &args)
            .await
            .unwrap();

        // Four recorded frames plus the empty one that reports exhaustion
        assert_eq!(stats.ticks, 5);
        assert_eq!(stats.added, 1);
        assert_eq!(stats.removed, 1);
    }

    #[tokio::test]
    async fn test_drive_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.jsonl");
        let hand = SensorHand::new(HandId(3), Handedness::Right, Point3D::new(0.0, 200.0, 0.0));
        let good = |id| {
            serde_json::to_string(&SensorFrame::new(id, InteractionBox::default(), vec![hand.clone()]))
                .unwrap()
        };
        std::fs::write(&path, format!("{}\nnot json\n{}\n", good(1), good(2))).unwrap();

        let args = RunArgs {
            tick_rate_ms: Some(1),
            ..RunArgs::default()
        };
        let stats = drive(ReplaySource::open(&path).unwrap(), &HandrigConfig::default(), &args)
            .await
            .unwrap();

        // Both good frames and the exhaustion tick ran; the bad line did not
        assert_eq!(stats.ticks, 3);
        assert_eq!(stats.added, 1);
        assert_eq!(stats.removed, 1);
    }

    #[tokio::test]
    async fn test_drive_stops_at_tick_limit() {
        let args = RunArgs {
            ticks: Some(3),
            tick_rate_ms: Some(1),
            json: false,
        };
        let config = HandrigConfig::default();
        let source = SimulatedSource::new(config.simulation_settings());
        let stats = drive(source, &config, &args).await.unwrap();
        assert_eq!(stats.ticks, 3);
        assert_eq!(stats.added, 2);
    }
}
