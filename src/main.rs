//! NEXUS Gesture Agent CLI
//!
//! Real-time hand gesture recognition over landmark frames.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use nexus_gesture_agent::{
    config::Config,
    core::{extract_features, EventBuilder, GestureClassifier, GestureLabel, GesturePipeline},
    source::{scripted_frames, HandObservation, Landmark, ReplaySource, ScriptStep},
    stats::create_shared_stats,
    GESTURE_GUIDE, VERSION,
};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_SCRIPT: &str = "fist,palm,point,peace,thumbsup,thumbsdown,rock,ok,spiderman,none";

#[derive(Parser)]
#[command(name = "nexus-gesture")]
#[command(author = "NEXUS")]
#[command(version = VERSION)]
#[command(about = "Real-time hand gesture recognition", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize gestures in a stream of landmark frames (JSON lines)
    Run {
        /// Frame input file, or `-` for stdin
        #[arg(long, short, default_value = "-")]
        input: PathBuf,

        /// Configuration file (defaults to the user config)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write events to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Also record events into the configured export directory
        #[arg(long)]
        record: bool,

        /// Smoothing window length (frames)
        #[arg(long)]
        window: Option<usize>,

        /// Log gesture transitions and action firings
        #[arg(long, short)]
        verbose: bool,
    },

    /// Classify a single hand pose
    Classify {
        /// JSON file with 21 landmarks, bare or as `{"landmarks": [...]}`
        #[arg(long)]
        pose: PathBuf,
    },

    /// Emit a synthetic frame stream for a gesture script
    Simulate {
        /// Comma-separated gestures; `none` for frames without a hand
        #[arg(long, default_value = DEFAULT_SCRIPT)]
        script: String,

        /// Frames to hold each scripted gesture
        #[arg(long, default_value = "30")]
        frames_per_gesture: usize,

        /// Milliseconds between frames
        #[arg(long, default_value = "16")]
        interval_ms: f64,

        /// Replace every n-th hand frame with an unrecognised pose
        #[arg(long)]
        flicker_every: Option<usize>,
    },

    /// Display the gesture guide and active bindings
    Gestures,

    /// Show configuration
    Config {
        /// Write the default configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

/// A pose file: either a bare landmark array or a hand object.
#[derive(Deserialize)]
#[serde(untagged)]
enum PoseFile {
    Landmarks(Vec<Landmark>),
    Hand(HandObservation),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });
    init_tracing(verbose);

    match cli.command {
        Commands::Run {
            input,
            config,
            output,
            record,
            window,
            verbose: _,
        } => cmd_run(&input, config, output, record, window),
        Commands::Classify { pose } => cmd_classify(&pose),
        Commands::Simulate {
            script,
            frames_per_gesture,
            interval_ms,
            flicker_every,
        } => cmd_simulate(&script, frames_per_gesture, interval_ms, flicker_every),
        Commands::Gestures => cmd_gestures(),
        Commands::Config { init } => cmd_config(init),
    }
}

/// Logs go to stderr; stdout carries JSON.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("Failed to load configuration from {path:?}")),
        None => Ok(Config::load().unwrap_or_else(|e| {
            warn!("Could not load configuration, using defaults: {e}");
            Config::default()
        })),
    }
}

fn create_output(path: &Path) -> Result<Box<dyn Write>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {parent:?}"))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {path:?}"))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn cmd_run(
    input: &Path,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
    record: bool,
    window: Option<usize>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(window) = window {
        config.smoothing_window = window;
    }
    config.validate()?;

    eprintln!("NEXUS Gesture Agent v{VERSION}");
    eprintln!("  Input: {}", input.display());
    eprintln!("  Smoothing window: {} frames", config.smoothing_window);
    eprintln!("  Bindings: {}", config.bindings.len());

    let stats = create_shared_stats();
    let mut source = ReplaySource::from_path(input)?.with_stats(stats.clone());
    let mut pipeline = GesturePipeline::new(&config).with_stats(stats.clone());
    let mut builder = EventBuilder::new();
    eprintln!("  Session ID: {}", builder.session_id());

    let mut out: Box<dyn Write> = match &output {
        Some(path) => create_output(path)?,
        None => Box::new(io::stdout().lock()),
    };

    let mut recording = if record {
        config.ensure_directories()?;
        let path = config.export_path.join(format!(
            "session_{}.jsonl",
            Utc::now().format("%Y%m%d_%H%M%S")
        ));
        eprintln!("  Recording to: {}", path.display());
        Some(create_output(&path)?)
    } else {
        None
    };
    eprintln!();

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone())?;

    source.start()?;
    let receiver = source.receiver().clone();

    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(frame) => {
                let result = pipeline.process_frame(&frame);
                for update in result.updates.iter().filter(|u| !u.actions.is_empty()) {
                    let actions: Vec<&str> = update.actions.iter().map(|a| a.as_str()).collect();
                    info!(
                        hand_id = ?update.hand_id,
                        at_ms = result.timestamp_ms,
                        "Triggered {}",
                        actions.join(", ")
                    );
                }

                let line = builder.build_json(&result);
                writeln!(out, "{line}").context("Failed to write event")?;
                if let Some(recording) = recording.as_mut() {
                    writeln!(recording, "{line}").context("Failed to record event")?;
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }
    }

    source.stop();
    out.flush().context("Failed to flush events")?;
    if let Some(mut recording) = recording {
        recording.flush().context("Failed to flush recording")?;
    }

    eprintln!();
    eprintln!("Processed {} frames", builder.frames_built());
    eprintln!("{}", stats.summary());
    Ok(())
}

fn cmd_classify(pose: &Path) -> Result<()> {
    let content =
        std::fs::read_to_string(pose).with_context(|| format!("Failed to read {pose:?}"))?;
    let landmarks = match serde_json::from_str::<PoseFile>(&content)
        .with_context(|| format!("{pose:?} is not a landmark array or hand object"))?
    {
        PoseFile::Landmarks(landmarks) => landmarks,
        PoseFile::Hand(hand) => hand.landmarks,
    };

    let config = Config::load().unwrap_or_default();
    let features = extract_features(&landmarks, &config.thresholds)?;
    let classifier = GestureClassifier::new(config.thresholds);
    let label = classifier.classify(&features);
    let matching = classifier.matching_rules(&features);

    let flag = |extended: bool| if extended { "extended" } else { "curled" };

    println!("Gesture: {label}");
    println!();
    println!("Features:");
    println!("  Thumb:  {}", flag(features.fingers.thumb));
    println!("  Index:  {}", flag(features.fingers.index));
    println!("  Middle: {}", flag(features.fingers.middle));
    println!("  Ring:   {}", flag(features.fingers.ring));
    println!("  Pinky:  {}", flag(features.fingers.pinky));
    println!("  Handedness: {}", features.handedness.as_str());
    println!(
        "  Palm centre: ({:.3}, {:.3}, {:.3})",
        features.palm_center.x, features.palm_center.y, features.palm_center.z
    );
    println!("  Openness: {:.2}", features.openness);
    println!();
    if matching.is_empty() {
        println!("Matching rules: none");
    } else {
        let names: Vec<&str> = matching.iter().map(|l| l.as_str()).collect();
        println!("Matching rules: {}", names.join(" > "));
    }
    Ok(())
}

fn parse_script(script: &str) -> Result<Vec<ScriptStep>> {
    script
        .split(',')
        .map(str::trim)
        .filter(|step| !step.is_empty())
        .map(|step| -> Result<ScriptStep> {
            if step.eq_ignore_ascii_case("none") {
                Ok(None)
            } else {
                Ok(Some(step.parse::<GestureLabel>()?))
            }
        })
        .collect()
}

fn cmd_simulate(
    script: &str,
    frames_per_gesture: usize,
    interval_ms: f64,
    flicker_every: Option<usize>,
) -> Result<()> {
    if interval_ms.is_nan() || interval_ms <= 0.0 {
        bail!("--interval-ms must be positive");
    }
    let steps = parse_script(script)?;
    if steps.is_empty() {
        bail!("Gesture script is empty");
    }

    let mut out = io::stdout().lock();
    for frame in scripted_frames(&steps, frames_per_gesture, interval_ms, flicker_every) {
        writeln!(out, "{}", serde_json::to_string(&frame)?)?;
    }
    out.flush()?;
    Ok(())
}

fn cmd_gestures() -> Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("{GESTURE_GUIDE}");
    println!("Active bindings:");
    for binding in &config.bindings {
        println!(
            "  {:<13} {:<11} hold > {} ms, cool-down {} ms",
            binding.action.as_str(),
            binding.label.as_str(),
            binding.hold_ms,
            binding.cooldown_ms
        );
    }
    Ok(())
}

fn cmd_config(init: bool) -> Result<()> {
    if init {
        let config = Config::default();
        config.save()?;
        println!("Wrote default configuration to {:?}", Config::config_path());
        return Ok(());
    }

    let config = Config::load()?;

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl+C handler")
}
