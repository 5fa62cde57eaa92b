//! Per-frame gesture pipeline.
//!
//! Runs every hand in a frame through extraction, classification, smoothing
//! and activation. State is kept per hand in a map keyed by hand ID, so two
//! hands never share a smoothing window or a cool-down clock.

use crate::config::{Config, RecognitionThresholds};
use crate::core::activation::{ActionBinding, ActivationState};
use crate::core::classifier::GestureClassifier;
use crate::core::event::HandUpdate;
use crate::core::features::{extract_features, InvalidPoseError};
use crate::core::smoothing::SmoothingWindow;
use crate::source::types::Frame;
use crate::stats::SharedSessionStats;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// A hand skipped because its pose could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedHand {
    pub hand_id: u32,
    pub error: InvalidPoseError,
}

/// Result of processing one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    /// Frame time used for hold and cool-down arithmetic
    pub timestamp_ms: f64,
    /// One update per valid hand, in frame order; a single "lost" update if
    /// the frame had no hands
    pub updates: Vec<HandUpdate>,
    pub rejected: Vec<RejectedHand>,
}

impl FrameOutput {
    /// Whether any action fired on this frame.
    pub fn has_actions(&self) -> bool {
        self.updates.iter().any(|u| !u.actions.is_empty())
    }
}

/// State for one tracked hand.
#[derive(Debug, Clone)]
struct HandTrack {
    window: SmoothingWindow,
    activation: ActivationState,
    last_seen_ms: f64,
    present: bool,
}

impl HandTrack {
    fn new(window_size: usize, now_ms: f64) -> Self {
        Self {
            window: SmoothingWindow::new(window_size),
            activation: ActivationState::new(),
            last_seen_ms: now_ms,
            present: false,
        }
    }

    /// Hand left the frame.
    fn lose(&mut self) {
        self.window.clear();
        self.activation.release();
        self.present = false;
    }
}

/// Stateful gesture recognizer over a stream of frames.
pub struct GesturePipeline {
    thresholds: RecognitionThresholds,
    classifier: GestureClassifier,
    bindings: Vec<ActionBinding>,
    window_size: usize,
    frame_interval_ms: f64,
    track_eviction_ms: f64,
    tracks: HashMap<u32, HandTrack>,
    last_timestamp_ms: Option<f64>,
    stats: Option<SharedSessionStats>,
}

impl GesturePipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            thresholds: config.thresholds,
            classifier: GestureClassifier::new(config.thresholds),
            bindings: config.bindings.clone(),
            window_size: config.smoothing_window,
            frame_interval_ms: config.frame_interval_ms,
            // Never evict a hand while one of its cool-downs can still be running.
            track_eviction_ms: config.track_eviction_ms.max(config.max_cooldown_ms()),
            tracks: HashMap::new(),
            last_timestamp_ms: None,
            stats: None,
        }
    }

    /// Count frames, hands and firings into shared session statistics.
    pub fn with_stats(mut self, stats: SharedSessionStats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    pub fn bindings(&self) -> &[ActionBinding] {
        &self.bindings
    }

    /// IDs of hands with live state, sorted.
    pub fn tracked_hands(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.tracks.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Activation state of a tracked hand.
    pub fn activation(&self, hand_id: u32) -> Option<&ActivationState> {
        self.tracks.get(&hand_id).map(|track| &track.activation)
    }

    /// Drop all per-hand state and the frame clock.
    pub fn reset(&mut self) {
        self.tracks.clear();
        self.last_timestamp_ms = None;
    }

    pub fn process_frame(&mut self, frame: &Frame) -> FrameOutput {
        let now = self.advance_clock(frame.timestamp_ms);
        if let Some(stats) = &self.stats {
            stats.record_frame();
        }

        if !frame.has_hands() {
            for track in self.tracks.values_mut().filter(|t| t.present) {
                track.lose();
            }
            self.evict_stale(now);
            if let Some(stats) = &self.stats {
                stats.record_frame_without_hands();
            }
            return FrameOutput {
                timestamp_ms: now,
                updates: vec![HandUpdate::lost()],
                rejected: Vec::new(),
            };
        }

        if let Some(stats) = &self.stats {
            stats.record_hands(frame.hands.len() as u64);
        }

        let mut seen = HashSet::new();
        let mut updates = Vec::with_capacity(frame.hands.len());
        let mut rejected = Vec::new();

        for (position, hand) in frame.hands.iter().enumerate() {
            let hand_id = hand.track_id.unwrap_or(position as u32);
            if !seen.insert(hand_id) {
                warn!(hand_id, "duplicate hand ID in frame, skipping");
                continue;
            }

            let features = match extract_features(&hand.landmarks, &self.thresholds) {
                Ok(features) => features,
                Err(error) => {
                    warn!(hand_id, %error, "rejected hand pose");
                    if let Some(stats) = &self.stats {
                        stats.record_rejected_pose();
                    }
                    rejected.push(RejectedHand { hand_id, error });
                    continue;
                }
            };

            let raw = self.classifier.classify(&features);
            let window_size = self.window_size;
            let track = self
                .tracks
                .entry(hand_id)
                .or_insert_with(|| HandTrack::new(window_size, now));

            let interval = (now - track.last_seen_ms).max(0.0);
            let smoothed = track.window.push(raw);
            track.activation.observe(smoothed, interval);
            track.last_seen_ms = now;
            track.present = true;

            let actions = track.activation.fire_ready(&self.bindings, now);
            if let Some(stats) = &self.stats {
                stats.record_actions(actions.len() as u64);
            }

            updates.push(HandUpdate::tracked(
                hand_id,
                smoothed,
                &features,
                track.activation.hold_duration_ms(),
                actions,
            ));
        }

        for (hand_id, track) in self.tracks.iter_mut() {
            if track.present && !seen.contains(hand_id) {
                debug!(hand_id, "hand left the frame");
                track.lose();
            }
        }
        self.evict_stale(now);

        FrameOutput {
            timestamp_ms: now,
            updates,
            rejected,
        }
    }

    /// Frame time from the timestamp if present, else one nominal interval
    /// after the previous frame.
    fn advance_clock(&mut self, timestamp_ms: Option<f64>) -> f64 {
        let now = match timestamp_ms.filter(|t| t.is_finite()) {
            Some(t) => t,
            None => self
                .last_timestamp_ms
                .map_or(0.0, |last| last + self.frame_interval_ms),
        };
        self.last_timestamp_ms = Some(now);
        now
    }

    fn evict_stale(&mut self, now: f64) {
        let limit = self.track_eviction_ms;
        self.tracks.retain(|hand_id, track| {
            let keep = track.present || now - track.last_seen_ms <= limit;
            if !keep {
                debug!(hand_id = *hand_id, "evicting hand state");
            }
            keep
        });
    }
}
