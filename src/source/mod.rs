//! Landmark frame sources.
//!
//! The live camera pipeline is an external collaborator; this module defines
//! the frame records it delivers, a JSON-lines replay source, and a synthetic
//! hand generator.

pub mod replay;
pub mod synthetic;
pub mod types;

// Re-export commonly used types
pub use replay::{ReplaySource, SourceError};
pub use synthetic::{scripted_frames, FingerShape, ScriptStep, SyntheticHand, ThumbShape};
pub use types::{index, Frame, HandObservation, Landmark, LANDMARK_COUNT};
