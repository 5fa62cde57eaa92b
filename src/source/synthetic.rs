//! Synthetic hand skeletons.
//!
//! Produces plausible 21-point right-hand poses (mirrored camera view, wrist
//! near the bottom centre of the frame) for every gesture in the vocabulary.
//! Used to drive the pipeline without a camera.

use crate::core::classifier::GestureLabel;
use crate::source::types::{Frame, HandObservation, Landmark, LANDMARK_COUNT};

const WRIST: (f64, f64) = (0.50, 0.80);
const THUMB_CMC: (f64, f64) = (0.45, 0.76);

/// Knuckle (MCP) positions for index, middle, ring, pinky.
const FINGER_MCPS: [(f64, f64); 4] = [(0.45, 0.60), (0.50, 0.58), (0.55, 0.60), (0.60, 0.62)];

/// Shape of a non-thumb finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerShape {
    Extended,
    Curled,
    /// Index bent over to meet the thumb tip (OK sign).
    Hooked,
}

/// Shape of the thumb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbShape {
    /// Folded against the palm.
    Tucked,
    /// Spread sideways away from the palm.
    Out,
    Up,
    Down,
    /// Tip resting on a hooked index tip.
    Pinched,
}

/// A parametric hand pose.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticHand {
    pub thumb: ThumbShape,
    /// Index, middle, ring, pinky.
    pub fingers: [FingerShape; 4],
    offset: (f64, f64),
    left: bool,
}

impl SyntheticHand {
    pub fn new(thumb: ThumbShape, fingers: [FingerShape; 4]) -> Self {
        Self {
            thumb,
            fingers,
            offset: (0.0, 0.0),
            left: false,
        }
    }

    /// Canonical pose for a gesture.
    pub fn for_gesture(label: GestureLabel) -> Self {
        use FingerShape::{Curled as C, Extended as E, Hooked as H};

        match label {
            GestureLabel::Fist => Self::new(ThumbShape::Tucked, [C, C, C, C]),
            GestureLabel::Palm => Self::new(ThumbShape::Out, [E, E, E, E]),
            GestureLabel::Point => Self::new(ThumbShape::Tucked, [E, C, C, C]),
            GestureLabel::Peace => Self::new(ThumbShape::Tucked, [E, E, C, C]),
            GestureLabel::Thumbsup => Self::new(ThumbShape::Up, [C, C, C, C]),
            GestureLabel::Thumbsdown => Self::new(ThumbShape::Down, [C, C, C, C]),
            GestureLabel::Rock => Self::new(ThumbShape::Tucked, [E, C, C, E]),
            GestureLabel::Ok => Self::new(ThumbShape::Pinched, [H, E, E, E]),
            GestureLabel::Spiderman => Self::new(ThumbShape::Out, [E, C, C, E]),
            // Three fingers up matches no rule.
            GestureLabel::Unknown => Self::new(ThumbShape::Tucked, [E, E, E, C]),
        }
    }

    /// Shift the whole hand in the image plane.
    pub fn translated(mut self, dx: f64, dy: f64) -> Self {
        self.offset = (self.offset.0 + dx, self.offset.1 + dy);
        self
    }

    /// Mirror the hand about the wrist so it reads as a left hand.
    pub fn left_handed(mut self) -> Self {
        self.left = true;
        self
    }

    /// All 21 landmarks in anatomical order.
    pub fn landmarks(&self) -> Vec<Landmark> {
        let mut points = Vec::with_capacity(LANDMARK_COUNT);
        points.push(WRIST);
        points.push(THUMB_CMC);
        points.extend_from_slice(&thumb_joints(self.thumb));
        for (mcp, shape) in FINGER_MCPS.iter().zip(self.fingers) {
            points.extend_from_slice(&finger_joints(*mcp, shape));
        }

        points
            .into_iter()
            .map(|(x, y)| {
                let x = if self.left { 2.0 * WRIST.0 - x } else { x };
                Landmark::new(x + self.offset.0, y + self.offset.1, 0.0)
            })
            .collect()
    }

    pub fn observation(&self) -> HandObservation {
        HandObservation::new(self.landmarks())
    }
}

/// MCP, IP, tip.
fn thumb_joints(shape: ThumbShape) -> [(f64, f64); 3] {
    match shape {
        ThumbShape::Tucked => [(0.42, 0.72), (0.44, 0.66), (0.47, 0.64)],
        ThumbShape::Out => [(0.38, 0.72), (0.32, 0.68), (0.26, 0.64)],
        ThumbShape::Up => [(0.40, 0.70), (0.38, 0.60), (0.37, 0.50)],
        ThumbShape::Down => [(0.40, 0.70), (0.38, 0.80), (0.37, 0.90)],
        ThumbShape::Pinched => [(0.40, 0.70), (0.38, 0.64), (0.39, 0.59)],
    }
}

/// MCP, PIP, DIP, tip.
fn finger_joints(mcp: (f64, f64), shape: FingerShape) -> [(f64, f64); 4] {
    let (x, y) = mcp;
    match shape {
        FingerShape::Extended => [(x, y), (x, y - 0.08), (x, y - 0.12), (x, y - 0.16)],
        FingerShape::Curled => [(x, y), (x, y - 0.03), (x, y), (x, y + 0.05)],
        FingerShape::Hooked => [(x, y), (x - 0.03, y - 0.06), (x - 0.05, y - 0.05), (x - 0.05, y - 0.02)],
    }
}

/// One step of a simulation script: a gesture, or `None` for no hand.
pub type ScriptStep = Option<GestureLabel>;

/// Build a frame stream that holds each scripted gesture for
/// `frames_per_step` frames, spaced `interval_ms` apart.
///
/// With `flicker_every = Some(n)`, every n-th hand frame shows an
/// unrecognised pose instead, which the smoother should absorb.
pub fn scripted_frames(
    script: &[ScriptStep],
    frames_per_step: usize,
    interval_ms: f64,
    flicker_every: Option<usize>,
) -> Vec<Frame> {
    let mut frames = Vec::with_capacity(script.len() * frames_per_step);
    let mut frame_index = 0usize;

    for step in script {
        for _ in 0..frames_per_step {
            let timestamp = Some(frame_index as f64 * interval_ms);
            frame_index += 1;

            let frame = match step {
                None => Frame::empty(timestamp),
                Some(label) => {
                    let flicker = flicker_every.is_some_and(|n| n > 0 && frame_index % n == 0);
                    let shown = if flicker { GestureLabel::Unknown } else { *label };
                    let hand = SyntheticHand::for_gesture(shown).observation().with_track_id(0);
                    Frame::with_hands(timestamp, vec![hand])
                }
            };
            frames.push(frame);
        }
    }

    frames
}
