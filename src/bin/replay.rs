//! intrusion-replay - run recorded detections through the intrusion engine
//!
//! Each line of the detections file is one detector run:
//!
//! ```json
//! {"detections": [{"bbox": [412.0, 80.5, 470.2, 260.0], "score": 0.82, "class_id": 0}]}
//! ```
//!
//! With `detect_every_n_frames = N`, line k is the detector output for video
//! frame k * N; the frames in between reuse the previous tracks. The alarm
//! clock advances by 1 / fps per video frame.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use intrusion_rs::{AlarmEvent, IntrusionPipeline, RecordedDetections, Settings, ZoneIndex};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Replay recorded person detections against restricted zones
#[derive(Parser, Debug)]
#[command(name = "intrusion-replay", version, about)]
struct Args {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Zones JSON file, overrides `[zones] file` from the config
    #[arg(short, long)]
    zones: Option<PathBuf>,

    /// Recorded detections in JSON Lines format
    #[arg(short, long)]
    detections: PathBuf,

    /// Video frame rate driving the alarm clock
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Print each frame report as a JSON line on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Default: INFO, use RUST_LOG=debug to see track births and expiries
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let frame_period = frame_period(args.fps)?;

    let settings = match &args.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    let zones_path = args.zones.as_ref().unwrap_or(&settings.zones.file);
    let zones = ZoneIndex::from_file(zones_path)
        .with_context(|| format!("loading zones from {}", zones_path.display()))?;
    if zones.is_empty() {
        warn!("no zones configured, the alarm cannot trigger");
    }

    let recording = RecordedDetections::from_jsonl(&args.detections)?;
    let detector_runs = recording.remaining();
    info!(
        detector_runs,
        zones = zones.len(),
        stride = settings.pipeline.detect_every_n_frames,
        "replay starting"
    );

    let mut pipeline = IntrusionPipeline::new(recording, &settings, zones)?;

    let start = Instant::now();
    let mut out = io::stdout().lock();
    let mut raised = 0usize;
    let mut video_frame: u32 = 0;

    while !pipeline.detector().is_exhausted() {
        let now = frame_period
            .checked_mul(video_frame)
            .and_then(|offset| start.checked_add(offset))
            .with_context(|| format!("replay clock overflowed at frame {video_frame}"))?;
        let report = match pipeline.process_frame_at(&[], 0, 0, now) {
            Ok(report) => report,
            Err(never) => match never {},
        };

        if let Some(event) = report.event {
            if event == AlarmEvent::Raised {
                raised += 1;
            }
            info!(
                frame = report.frame_index,
                at = ?(now - start),
                ?event,
                intruders = ?report.alarm.intruders,
                "alarm transition"
            );
        }

        if args.json {
            serde_json::to_writer(&mut out, &report)?;
            writeln!(out)?;
        }
        video_frame = video_frame
            .checked_add(1)
            .context("recording has too many frames")?;
    }
    out.flush()?;

    info!(
        frames = pipeline.monitor().frame_index(),
        raised,
        still_active = pipeline.monitor().alarm().is_active(),
        "replay finished"
    );
    Ok(())
}

/// Virtual time between two video frames.
fn frame_period(fps: f64) -> Result<Duration> {
    ensure!(
        fps.is_finite() && fps > 0.0,
        "--fps must be a positive number, got {fps}"
    );
    Duration::try_from_secs_f64(1.0 / fps)
        .with_context(|| format!("--fps {fps} gives an unrepresentable frame period"))
}
