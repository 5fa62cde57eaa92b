//! Core recognition pipeline for the NEXUS gesture agent.
//!
//! This module contains:
//! - Feature extraction from 21-point hand skeletons
//! - Rule-based gesture classification
//! - Majority-vote smoothing of raw labels
//! - Hold and cool-down tracking for bound actions
//! - The per-hand pipeline and the events it emits

pub mod activation;
pub mod classifier;
pub mod event;
pub mod features;
pub mod pipeline;
pub mod smoothing;

// Re-export commonly used types
pub use activation::{default_bindings, ActionBinding, ActionKind, ActivationState};
pub use classifier::{classify, GestureClassifier, GestureLabel, GestureRule, RULES};
pub use event::{EventBuilder, FrameEvent, HandUpdate};
pub use features::{extract_features, FeatureVector, FingerStates, Handedness, InvalidPoseError};
pub use pipeline::{FrameOutput, GesturePipeline, RejectedHand};
pub use smoothing::SmoothingWindow;
