//! NEXUS Gesture Agent - real-time hand gesture recognition.
//!
//! This library turns per-frame hand landmarks from a pose estimator into
//! stable gesture labels and debounced, hold-to-trigger actions.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       NEXUS Gesture Agent                        │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐            │
//! │  │   Source    │──▶│  Features   │──▶│ Classifier  │            │
//! │  │(JSONL/synth)│   │ (per hand)  │   │ (rule list) │            │
//! │  └─────────────┘   └─────────────┘   └─────────────┘            │
//! │         │                                    │                   │
//! │         ▼                                    ▼                   │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐            │
//! │  │   Session   │   │   Events    │◀──│ Smoothing + │            │
//! │  │    Stats    │   │  (JSONL)    │   │ Activation  │            │
//! │  └─────────────┘   └─────────────┘   └─────────────┘            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use nexus_gesture_agent::{
//!     config::Config,
//!     core::{GestureLabel, GesturePipeline},
//!     source::{Frame, SyntheticHand},
//! };
//!
//! let mut pipeline = GesturePipeline::new(&Config::default());
//! let hand = SyntheticHand::for_gesture(GestureLabel::Peace).observation();
//! let output = pipeline.process_frame(&Frame::with_hands(Some(0.0), vec![hand]));
//!
//! assert_eq!(output.updates[0].gesture_label, Some(GestureLabel::Peace));
//! ```

pub mod config;
pub mod core;
pub mod source;
pub mod stats;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, RecognitionThresholds};
pub use core::{
    extract_features, ActionBinding, ActionKind, EventBuilder, FrameEvent, FrameOutput,
    GestureClassifier, GestureLabel, GesturePipeline, HandUpdate, InvalidPoseError,
    SmoothingWindow,
};
pub use source::{Frame, HandObservation, Landmark, ReplaySource, SourceError, SyntheticHand};
pub use stats::{create_shared_stats, SessionStats, SharedSessionStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Gesture guide that can be displayed to users.
pub const GESTURE_GUIDE: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║                 NEXUS GESTURE AGENT - GESTURE GUIDE              ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  Hold your hand upright, palm facing the camera.                 ║
║                                                                  ║
║    fist        all fingers and thumb folded                      ║
║    palm        all five fingers spread                           ║
║    point       index finger up                                   ║
║    peace       index and middle fingers up                       ║
║    thumbsup    thumb up, other fingers folded                    ║
║    thumbsdown  thumb down, other fingers folded                  ║
║    rock        index and pinky up, thumb folded                  ║
║    ok          thumb and index tips touching, others up          ║
║    spiderman   thumb, index and pinky out                        ║
║                                                                  ║
║  A gesture triggers its action once held steadily; each action   ║
║  then rests for its cool-down before it can trigger again.       ║
║                                                                  ║
║  See the active bindings with:                                   ║
║    nexus-gesture gestures                                        ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;
