//! Rule-based gesture classification.
//!
//! Rules are an ordered list of `(label, predicate)` pairs evaluated top to
//! bottom; the first match wins. Several gestures share a finger-flag
//! signature, so the more specific poses (thumb orientation, fingertip
//! contact) come before the looser multi-finger patterns that would
//! otherwise shadow them.

use crate::config::RecognitionThresholds;
use crate::core::features::FeatureVector;
use crate::source::types::index;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed gesture vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureLabel {
    Fist,
    Palm,
    Point,
    Peace,
    Thumbsup,
    Thumbsdown,
    Rock,
    Ok,
    Spiderman,
    Unknown,
}

impl GestureLabel {
    pub const ALL: [GestureLabel; 10] = [
        Self::Fist,
        Self::Palm,
        Self::Point,
        Self::Peace,
        Self::Thumbsup,
        Self::Thumbsdown,
        Self::Rock,
        Self::Ok,
        Self::Spiderman,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fist => "fist",
            Self::Palm => "palm",
            Self::Point => "point",
            Self::Peace => "peace",
            Self::Thumbsup => "thumbsup",
            Self::Thumbsdown => "thumbsdown",
            Self::Rock => "rock",
            Self::Ok => "ok",
            Self::Spiderman => "spiderman",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown gesture label: {0}")]
pub struct ParseLabelError(pub String);

impl FromStr for GestureLabel {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == wanted)
            .ok_or_else(|| ParseLabelError(s.to_string()))
    }
}

/// Predicate over one hand's features.
pub type RulePredicate = fn(&FeatureVector, &RecognitionThresholds) -> bool;

/// One entry of the priority-ordered rule list.
#[derive(Clone, Copy)]
pub struct GestureRule {
    pub label: GestureLabel,
    pub matches: RulePredicate,
}

impl fmt::Debug for GestureRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureRule")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Classification rules in priority order. `unknown` is the fallthrough.
pub const RULES: [GestureRule; 9] = [
    GestureRule {
        label: GestureLabel::Thumbsup,
        matches: is_thumbs_up,
    },
    GestureRule {
        label: GestureLabel::Thumbsdown,
        matches: is_thumbs_down,
    },
    GestureRule {
        label: GestureLabel::Spiderman,
        matches: is_spiderman,
    },
    GestureRule {
        label: GestureLabel::Rock,
        matches: is_rock,
    },
    GestureRule {
        label: GestureLabel::Ok,
        matches: is_ok,
    },
    GestureRule {
        label: GestureLabel::Peace,
        matches: is_peace,
    },
    GestureRule {
        label: GestureLabel::Point,
        matches: is_point,
    },
    GestureRule {
        label: GestureLabel::Fist,
        matches: is_fist,
    },
    GestureRule {
        label: GestureLabel::Palm,
        matches: is_palm,
    },
];

/// Classify one hand. Always returns exactly one label.
pub fn classify(features: &FeatureVector, thresholds: &RecognitionThresholds) -> GestureLabel {
    RULES
        .iter()
        .find(|rule| (rule.matches)(features, thresholds))
        .map(|rule| rule.label)
        .unwrap_or(GestureLabel::Unknown)
}

/// Stateless classifier bound to a set of thresholds.
#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    thresholds: RecognitionThresholds,
}

impl GestureClassifier {
    pub fn new(thresholds: RecognitionThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &RecognitionThresholds {
        &self.thresholds
    }

    pub fn rules(&self) -> &'static [GestureRule] {
        &RULES
    }

    pub fn classify(&self, features: &FeatureVector) -> GestureLabel {
        classify(features, &self.thresholds)
    }

    /// Every rule the features satisfy, in priority order.
    ///
    /// The first entry is what [`classify`](Self::classify) returns; the
    /// rest are the rules it shadowed.
    pub fn matching_rules(&self, features: &FeatureVector) -> Vec<GestureLabel> {
        RULES
            .iter()
            .filter(|rule| (rule.matches)(features, &self.thresholds))
            .map(|rule| rule.label)
            .collect()
    }
}

fn thumb_rise(features: &FeatureVector) -> f64 {
    // Positive when the tip is above the MCP joint (y grows downward).
    features.landmark(index::THUMB_MCP).y - features.landmark(index::THUMB_TIP).y
}

fn is_thumbs_up(features: &FeatureVector, thresholds: &RecognitionThresholds) -> bool {
    let f = &features.fingers;
    f.thumb && thumb_rise(features) > thresholds.thumb_vertical_margin && f.others_curled()
}

fn is_thumbs_down(features: &FeatureVector, thresholds: &RecognitionThresholds) -> bool {
    let f = &features.fingers;
    f.thumb && -thumb_rise(features) > thresholds.thumb_vertical_margin && f.others_curled()
}

fn is_spiderman(features: &FeatureVector, _: &RecognitionThresholds) -> bool {
    let f = &features.fingers;
    f.thumb && f.index && !f.middle && !f.ring && f.pinky
}

fn is_rock(features: &FeatureVector, _: &RecognitionThresholds) -> bool {
    let f = &features.fingers;
    f.index && !f.middle && !f.ring && f.pinky
}

fn is_ok(features: &FeatureVector, thresholds: &RecognitionThresholds) -> bool {
    let f = &features.fingers;
    let gap = features
        .landmark(index::THUMB_TIP)
        .distance(features.landmark(index::INDEX_TIP));
    gap < thresholds.ok_touch_distance && f.middle && f.ring && f.pinky
}

fn is_peace(features: &FeatureVector, _: &RecognitionThresholds) -> bool {
    let f = &features.fingers;
    f.index && f.middle && !f.ring && !f.pinky
}

fn is_point(features: &FeatureVector, _: &RecognitionThresholds) -> bool {
    let f = &features.fingers;
    f.index && !f.middle && !f.ring && !f.pinky
}

fn is_fist(features: &FeatureVector, _: &RecognitionThresholds) -> bool {
    features.fingers.all_curled()
}

fn is_palm(features: &FeatureVector, _: &RecognitionThresholds) -> bool {
    features.fingers.all_extended()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::features::extract_features;
    use crate::source::synthetic::{FingerShape, SyntheticHand, ThumbShape};

    fn features_for(hand: SyntheticHand) -> FeatureVector {
        extract_features(&hand.landmarks(), &RecognitionThresholds::default()).unwrap()
    }

    fn classify_hand(hand: SyntheticHand) -> GestureLabel {
        GestureClassifier::default().classify(&features_for(hand))
    }

    #[test]
    fn test_canonical_poses() {
        for label in GestureLabel::ALL {
            let hand = SyntheticHand::for_gesture(label);
            assert_eq!(classify_hand(hand), label, "pose for {label}");
        }
    }

    #[test]
    fn test_classification_ignores_position_and_hand() {
        for label in GestureLabel::ALL {
            let moved = SyntheticHand::for_gesture(label).translated(-0.2, 0.05);
            let left = SyntheticHand::for_gesture(label).left_handed();
            assert_eq!(classify_hand(moved), label, "translated {label}");
            assert_eq!(classify_hand(left), label, "left-handed {label}");
        }
    }

    #[test]
    fn test_every_flag_combination_gets_one_label() {
        let classifier = GestureClassifier::default();
        let shapes = [FingerShape::Curled, FingerShape::Extended];

        for bits in 0u8..32 {
            let thumb = if bits & 1 == 1 {
                ThumbShape::Out
            } else {
                ThumbShape::Tucked
            };
            let fingers = [1, 2, 3, 4].map(|bit| shapes[usize::from((bits >> bit) & 1)]);
            let features = features_for(SyntheticHand::new(thumb, fingers));
            let label = classifier.classify(&features);

            assert!(GestureLabel::ALL.contains(&label));
            let expected = classifier
                .matching_rules(&features)
                .first()
                .copied()
                .unwrap_or(GestureLabel::Unknown);
            assert_eq!(label, expected, "combination {bits:05b}");

            if features.fingers.all_curled() {
                assert_eq!(label, GestureLabel::Fist);
            }
            if features.fingers.all_extended() {
                assert_eq!(label, GestureLabel::Palm);
            }
        }
    }

    #[test]
    fn test_spiderman_shadows_rock() {
        let classifier = GestureClassifier::default();
        let features = features_for(SyntheticHand::for_gesture(GestureLabel::Spiderman));

        assert_eq!(
            classifier.matching_rules(&features),
            vec![GestureLabel::Spiderman, GestureLabel::Rock]
        );
        assert_eq!(classifier.classify(&features), GestureLabel::Spiderman);
    }

    #[test]
    fn test_rule_priority_order() {
        let order: Vec<GestureLabel> = RULES.iter().map(|r| r.label).collect();
        assert_eq!(
            order,
            vec![
                GestureLabel::Thumbsup,
                GestureLabel::Thumbsdown,
                GestureLabel::Spiderman,
                GestureLabel::Rock,
                GestureLabel::Ok,
                GestureLabel::Peace,
                GestureLabel::Point,
                GestureLabel::Fist,
                GestureLabel::Palm,
            ]
        );
    }

    #[test]
    fn test_raised_sideways_thumb_with_curled_fingers_is_thumbsup() {
        // Tip sits 0.08 above the thumb MCP, past the 0.05 vertical margin.
        let hand = SyntheticHand::new(ThumbShape::Out, [FingerShape::Curled; 4]);
        assert_eq!(classify_hand(hand), GestureLabel::Thumbsup);
    }

    #[test]
    fn test_ok_requires_touching_tips() {
        let features = features_for(SyntheticHand::for_gesture(GestureLabel::Ok));
        let strict = GestureClassifier::new(RecognitionThresholds {
            ok_touch_distance: 0.01,
            ..RecognitionThresholds::default()
        });
        assert_eq!(strict.classify(&features), GestureLabel::Unknown);
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!("thumbsup".parse::<GestureLabel>(), Ok(GestureLabel::Thumbsup));
        assert_eq!(" Peace ".parse::<GestureLabel>(), Ok(GestureLabel::Peace));
        assert!("wave".parse::<GestureLabel>().is_err());
        for label in GestureLabel::ALL {
            assert_eq!(label.to_string().parse::<GestureLabel>(), Ok(label));
        }
    }

    #[test]
    fn test_label_serializes_lowercase() {
        let json = serde_json::to_string(&GestureLabel::Spiderman).unwrap();
        assert_eq!(json, "\"spiderman\"");
    }
}
