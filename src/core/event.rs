//! Outbound gesture events.
//!
//! Each processed frame becomes one [`FrameEvent`] holding a [`HandUpdate`]
//! per tracked hand. Field names are camelCase on the wire.

use crate::core::activation::ActionKind;
use crate::core::classifier::GestureLabel;
use crate::core::features::{FeatureVector, Handedness};
use crate::core::pipeline::FrameOutput;
use crate::source::types::Landmark;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gesture state of one hand in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandUpdate {
    /// Smoothed label, `null` when no hand is detected
    pub gesture_label: Option<GestureLabel>,
    /// Palm centre, `null` when no hand is detected
    pub hand_position: Option<Landmark>,
    pub hold_duration_ms: f64,
    pub hand_detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handedness: Option<Handedness>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openness: Option<f64>,
    /// Actions that fired on this frame
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionKind>,
}

impl HandUpdate {
    /// The "no hand in view" update.
    pub fn lost() -> Self {
        Self {
            gesture_label: None,
            hand_position: None,
            hold_duration_ms: 0.0,
            hand_detected: false,
            hand_id: None,
            handedness: None,
            openness: None,
            actions: Vec::new(),
        }
    }

    pub fn tracked(
        hand_id: u32,
        label: GestureLabel,
        features: &FeatureVector,
        hold_duration_ms: f64,
        actions: Vec<ActionKind>,
    ) -> Self {
        Self {
            gesture_label: Some(label),
            hand_position: Some(features.palm_center),
            hold_duration_ms,
            hand_detected: true,
            hand_id: Some(hand_id),
            handedness: Some(features.handedness),
            openness: Some(features.openness),
            actions,
        }
    }
}

/// One frame's worth of hand updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameEvent {
    pub session_id: Uuid,
    pub frame_index: u64,
    pub timestamp_ms: f64,
    pub hands: Vec<HandUpdate>,
}

/// Wraps pipeline output into numbered, session-tagged events.
pub struct EventBuilder {
    session_id: Uuid,
    next_index: u64,
}

impl EventBuilder {
    /// Create a builder with a fresh session ID.
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            next_index: 0,
        }
    }

    /// Continue an existing session.
    pub fn with_session_id(mut self, session_id: Uuid) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Number of events built so far.
    pub fn frames_built(&self) -> u64 {
        self.next_index
    }

    pub fn build(&mut self, output: &FrameOutput) -> FrameEvent {
        let event = FrameEvent {
            session_id: self.session_id,
            frame_index: self.next_index,
            timestamp_ms: output.timestamp_ms,
            hands: output.updates.clone(),
        };
        self.next_index += 1;
        event
    }

    /// Build and serialize an event as a single JSON line.
    pub fn build_json(&mut self, output: &FrameOutput) -> String {
        let event = self.build(output);
        serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}
