//! Feature extraction from a single hand skeleton.
//!
//! Turns 21 landmarks into a compact geometric summary: which fingers are
//! extended, which hand it is, and where the palm sits. Extraction is a pure
//! function of one pose; nothing carries over between frames.

use crate::config::RecognitionThresholds;
use crate::source::types::{index, Landmark, LANDMARK_COUNT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fingertip spread (summed tip-to-wrist distance) mapped to openness 0.
const OPENNESS_MIN_SPREAD: f64 = 0.3;

/// Fingertip spread mapped to openness 1.
const OPENNESS_MAX_SPREAD: f64 = 1.0;

/// A hand pose that cannot be turned into features.
///
/// The caller should skip the hand for this frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidPoseError {
    #[error("expected 21 landmarks, got {found}")]
    LandmarkCount { found: usize },
    #[error("landmark {index} is missing a coordinate")]
    MissingCoordinate { index: usize },
}

/// Per-finger extension flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerStates {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    pub fn new(thumb: bool, index: bool, middle: bool, ring: bool, pinky: bool) -> Self {
        Self {
            thumb,
            index,
            middle,
            ring,
            pinky,
        }
    }

    /// Index, middle, ring and pinky all curled.
    pub fn others_curled(&self) -> bool {
        !self.index && !self.middle && !self.ring && !self.pinky
    }

    pub fn all_curled(&self) -> bool {
        !self.thumb && self.others_curled()
    }

    pub fn all_extended(&self) -> bool {
        self.thumb && self.index && self.middle && self.ring && self.pinky
    }

    pub fn extended_count(&self) -> usize {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|&&f| f)
            .count()
    }
}

/// Which hand, as seen through a mirrored camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Geometric summary of one hand in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub fingers: FingerStates,
    pub handedness: Handedness,
    /// Mean of wrist, index knuckle and pinky knuckle
    pub palm_center: Landmark,
    /// 0 for a closed fist, 1 for a fully spread hand
    pub openness: f64,
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl FeatureVector {
    /// Raw landmark access for rules that need distances beyond the flags.
    pub fn landmark(&self, idx: usize) -> &Landmark {
        &self.landmarks[idx]
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }
}

/// Extract features from one hand's landmarks.
pub fn extract_features(
    landmarks: &[Landmark],
    thresholds: &RecognitionThresholds,
) -> Result<FeatureVector, InvalidPoseError> {
    let landmarks: [Landmark; LANDMARK_COUNT] =
        landmarks
            .try_into()
            .map_err(|_| InvalidPoseError::LandmarkCount {
                found: landmarks.len(),
            })?;

    if let Some(index) = landmarks.iter().position(|lm| !lm.is_finite()) {
        return Err(InvalidPoseError::MissingCoordinate { index });
    }

    let margin = thresholds.extension_margin;
    let fingers = FingerStates {
        thumb: thumb_extended(&landmarks, thresholds),
        index: finger_extended(&landmarks, index::INDEX_PIP, index::INDEX_TIP, margin),
        middle: finger_extended(&landmarks, index::MIDDLE_PIP, index::MIDDLE_TIP, margin),
        ring: finger_extended(&landmarks, index::RING_PIP, index::RING_TIP, margin),
        pinky: finger_extended(&landmarks, index::PINKY_PIP, index::PINKY_TIP, margin),
    };

    Ok(FeatureVector {
        fingers,
        handedness: handedness(&landmarks),
        palm_center: palm_center(&landmarks),
        openness: hand_openness(&landmarks),
        landmarks,
    })
}

/// A finger is extended when its tip sits clearly above its PIP joint.
///
/// Only holds for an upright hand facing the camera.
fn finger_extended(landmarks: &[Landmark], pip: usize, tip: usize, margin: f64) -> bool {
    landmarks[tip].y < landmarks[pip].y - margin
}

/// The thumb does not fold along the image y axis, so it is tested by
/// distance: unfolded away from the wrist, and not tucked against the palm.
fn thumb_extended(landmarks: &[Landmark], thresholds: &RecognitionThresholds) -> bool {
    let wrist = &landmarks[index::WRIST];
    let tip = &landmarks[index::THUMB_TIP];
    let ip = &landmarks[index::THUMB_IP];
    let index_mcp = &landmarks[index::INDEX_MCP];

    let unfolded = tip.distance(wrist) > ip.distance(wrist) * thresholds.thumb_extension_ratio;
    let clear_of_palm = tip.distance(index_mcp) > thresholds.thumb_palm_clearance;

    unfolded && clear_of_palm
}

fn handedness(landmarks: &[Landmark]) -> Handedness {
    // Mirrored view: a right hand shows its index knuckle left of its pinky knuckle.
    if landmarks[index::INDEX_MCP].x - landmarks[index::PINKY_MCP].x < 0.0 {
        Handedness::Right
    } else {
        Handedness::Left
    }
}

fn palm_center(landmarks: &[Landmark]) -> Landmark {
    let wrist = &landmarks[index::WRIST];
    let index_mcp = &landmarks[index::INDEX_MCP];
    let pinky_mcp = &landmarks[index::PINKY_MCP];

    Landmark {
        x: (wrist.x + index_mcp.x + pinky_mcp.x) / 3.0,
        y: (wrist.y + index_mcp.y + pinky_mcp.y) / 3.0,
        z: (wrist.z + index_mcp.z + pinky_mcp.z) / 3.0,
    }
}

fn hand_openness(landmarks: &[Landmark]) -> f64 {
    let wrist = &landmarks[index::WRIST];
    let spread: f64 = index::FINGERTIPS
        .iter()
        .map(|&tip| landmarks[tip].planar_distance(wrist))
        .sum();

    ((spread - OPENNESS_MIN_SPREAD) / (OPENNESS_MAX_SPREAD - OPENNESS_MIN_SPREAD)).clamp(0.0, 1.0)
}
