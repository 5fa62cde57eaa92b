//! Landmark frame types delivered by the external pose-estimation pipeline.
//!
//! A frame carries zero or more detected hands. An empty hand list is the
//! explicit "no hand detected" signal.

use serde::{Deserialize, Deserializer, Serialize};

/// Number of landmarks in one hand skeleton.
pub const LANDMARK_COUNT: usize = 21;

/// Hand landmark indices (MediaPipe hand landmark model convention).
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;

    /// Fingertips, thumb first.
    pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
}

/// A single hand landmark.
///
/// An absent or `null` x/y (or a `null` z) deserializes as NaN so the
/// feature extractor can reject that one hand instead of the whole frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// X coordinate (0.0 to 1.0, normalized to image width)
    #[serde(default = "missing_coordinate", deserialize_with = "coordinate")]
    pub x: f64,
    /// Y coordinate (0.0 to 1.0, normalized to image height, grows downward)
    #[serde(default = "missing_coordinate", deserialize_with = "coordinate")]
    pub y: f64,
    /// Relative depth; the sign says toward or away from the camera
    #[serde(default, deserialize_with = "coordinate")]
    pub z: f64,
}

fn missing_coordinate() -> f64 {
    f64::NAN
}

fn coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in 3D.
    pub fn distance(&self, other: &Landmark) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Distance in the image plane, ignoring depth.
    pub fn planar_distance(&self, other: &Landmark) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One detected hand as reported by the landmark source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandObservation {
    /// Stable tracking identifier, when the source provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<u32>,
    /// Landmarks in anatomical order; expected to hold exactly 21 points
    pub landmarks: Vec<Landmark>,
}

impl HandObservation {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self {
            track_id: None,
            landmarks,
        }
    }

    pub fn with_track_id(mut self, track_id: u32) -> Self {
        self.track_id = Some(track_id);
        self
    }
}

/// All hands observed in one camera frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frame {
    /// Capture time in milliseconds; synthesized from the nominal frame
    /// interval when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<f64>,
    /// Detected hands; empty means no hand was detected
    #[serde(default)]
    pub hands: Vec<HandObservation>,
}

impl Frame {
    /// A frame reporting no detected hand.
    pub fn empty(timestamp_ms: Option<f64>) -> Self {
        Self {
            timestamp_ms,
            hands: Vec::new(),
        }
    }

    pub fn with_hands(timestamp_ms: Option<f64>, hands: Vec<HandObservation>) -> Self {
        Self {
            timestamp_ms,
            hands,
        }
    }

    pub fn has_hands(&self) -> bool {
        !self.hands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_distance() {
        let a = Landmark::new(0.0, 0.0, 0.0);
        let b = Landmark::new(3.0, 4.0, 12.0);
        assert!((a.distance(&b) - 13.0).abs() < 1e-9);
        assert!((a.planar_distance(&b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_depth_defaults_to_zero() {
        let lm: Landmark = serde_json::from_str(r#"{"x": 0.25, "y": 0.5}"#).unwrap();
        assert_eq!(lm, Landmark::new(0.25, 0.5, 0.0));
    }

    #[test]
    fn test_frame_without_hands_field_is_empty() {
        let frame: Frame = serde_json::from_str(r#"{"timestamp_ms": 16.0}"#).unwrap();
        assert!(!frame.has_hands());
        assert_eq!(frame.timestamp_ms, Some(16.0));
    }

    #[test]
    fn test_missing_or_null_coordinate_is_not_finite() {
        let absent: Landmark = serde_json::from_str(r#"{"y": 0.5, "z": 0.0}"#).unwrap();
        assert!(absent.x.is_nan());
        assert!(!absent.is_finite());

        let null: Landmark = serde_json::from_str(r#"{"x": 0.1, "y": null}"#).unwrap();
        assert!(null.y.is_nan());
        assert_eq!(null.z, 0.0);
    }

    #[test]
    fn test_wrong_coordinate_type_is_rejected() {
        let result: Result<Landmark, _> = serde_json::from_str(r#"{"x": "left", "y": 0.5}"#);
        assert!(result.is_err());
    }
}
