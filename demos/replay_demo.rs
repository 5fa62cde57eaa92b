//! Demonstration of the NEXUS gesture pipeline.
//!
//! This example shows how to:
//! 1. Generate a synthetic landmark stream for a gesture script
//! 2. Replay it through a frame source
//! 3. Run each frame through the gesture pipeline
//! 4. Watch gesture transitions and triggered actions
//! 5. Emit camelCase gesture events
//!
//! Run with: cargo run --example replay_demo

use std::io::Cursor;
use std::time::Duration;

use nexus_gesture_agent::{
    config::Config,
    core::{EventBuilder, GestureLabel, GesturePipeline},
    source::{scripted_frames, ReplaySource},
    stats::create_shared_stats,
    GESTURE_GUIDE,
};

fn main() {
    println!("NEXUS Gesture Agent - Replay Demo");
    println!("=================================");
    println!("{GESTURE_GUIDE}");

    // One second of each gesture at ~30 fps, with a lost hand in the middle
    // and an occasional misread frame.
    let script = [
        Some(GestureLabel::Point),
        Some(GestureLabel::Peace),
        None,
        Some(GestureLabel::Thumbsup),
        Some(GestureLabel::Rock),
        Some(GestureLabel::Spiderman),
    ];
    let frames = scripted_frames(&script, 30, 33.0, Some(7));

    let mut input = String::new();
    for frame in &frames {
        match serde_json::to_string(frame) {
            Ok(line) => {
                input.push_str(&line);
                input.push('\n');
            }
            Err(e) => eprintln!("Error serializing frame: {e}"),
        }
    }
    println!("Generated {} frames", frames.len());
    println!();

    let config = Config::default();
    let stats = create_shared_stats();
    let mut source = ReplaySource::new(Cursor::new(input)).with_stats(stats.clone());
    let mut pipeline = GesturePipeline::new(&config).with_stats(stats.clone());
    let mut builder = EventBuilder::new();

    println!("Session ID: {}", builder.session_id());
    println!();

    if let Err(e) = source.start() {
        eprintln!("Error starting source: {e}");
        return;
    }

    let receiver = source.receiver().clone();
    let mut last_label: Option<GestureLabel> = None;
    let mut last_json = String::new();

    loop {
        let frame = match receiver.recv_timeout(Duration::from_millis(500)) {
            Ok(frame) => frame,
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        };

        let output = pipeline.process_frame(&frame);
        for update in &output.updates {
            if update.gesture_label != last_label {
                match update.gesture_label {
                    Some(label) => println!("  [{:>6.0} ms] gesture: {label}", output.timestamp_ms),
                    None => println!("  [{:>6.0} ms] hand lost", output.timestamp_ms),
                }
                last_label = update.gesture_label;
            }
            for action in &update.actions {
                println!(
                    "  [{:>6.0} ms]   -> {} (held {:.0} ms)",
                    output.timestamp_ms,
                    action.as_str(),
                    update.hold_duration_ms
                );
            }
        }

        last_json = builder.build_json(&output);
    }

    source.stop();

    println!();
    println!("Last event:");
    println!("  {last_json}");
    println!();
    println!("{}", stats.summary());
}
