// Posture classification - geometric rules over head and hand positions

use crate::core::config::Config;
use crate::core::joint_extractor::{self, TrackedJoints, MIN_JOINT_CONFIDENCE};
use crate::core::posture_detector::PostureSink;
use crate::models::posture::Posture;
use crate::models::skeleton::{SkeletonFrame, Vector3};

/// Maximum distance between both hands for them to count as joined (meters)
pub const EPSILON: f32 = 0.1;

/// Maximum per-axis offset between a hand and the head (meters)
pub const MAX_RANGE: f32 = 0.25;

// ==============================================================================
// Thresholds
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub epsilon: f32,
    pub max_range: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            epsilon: EPSILON,
            max_range: MAX_RANGE,
        }
    }
}

impl From<&Config> for Thresholds {
    fn from(config: &Config) -> Self {
        Self {
            epsilon: config.hands_joined_epsilon,
            max_range: config.max_range,
        }
    }
}

// ==============================================================================
// Predicates
// ==============================================================================

/// Both hands within `epsilon` of each other
pub fn check_hands_joined(
    left_hand: Option<Vector3>,
    right_hand: Option<Vector3>,
    thresholds: &Thresholds,
) -> bool {
    let (Some(left), Some(right)) = (left_hand, right_hand) else {
        return false;
    };

    (left - right).length() <= thresholds.epsilon
}

/// Hand at or above head height and horizontally and depth-wise close to it
pub fn check_hand_over_head(
    head: Option<Vector3>,
    hand: Option<Vector3>,
    thresholds: &Thresholds,
) -> bool {
    let (Some(head), Some(hand)) = (head, hand) else {
        return false;
    };

    if hand.y < head.y {
        return false;
    }

    (hand.x - head.x).abs() <= thresholds.max_range
        && (hand.z - head.z).abs() <= thresholds.max_range
}

/// Hand horizontally away from the head, but close vertically and in depth.
///
/// The horizontal test is the inverse of the one in [`check_hand_over_head`]:
/// the hand must be more than `max_range` to the side.
pub fn check_hello(head: Option<Vector3>, hand: Option<Vector3>, thresholds: &Thresholds) -> bool {
    let (Some(head), Some(hand)) = (head, hand) else {
        return false;
    };

    if (hand.x - head.x).abs() <= thresholds.max_range {
        return false;
    }

    (hand.y - head.y).abs() <= thresholds.max_range
        && (hand.z - head.z).abs() <= thresholds.max_range
}

// ==============================================================================
// Classification
// ==============================================================================

/// Classify with the default thresholds
pub fn classify(joints: &TrackedJoints) -> Option<Posture> {
    classify_with(joints, &Thresholds::default())
}

/// Evaluate the predicates in priority order; the first match wins
pub fn classify_with(joints: &TrackedJoints, thresholds: &Thresholds) -> Option<Posture> {
    let TrackedJoints {
        head,
        left_hand,
        right_hand,
    } = *joints;

    if check_hands_joined(left_hand, right_hand, thresholds) {
        Some(Posture::HandsJoined)
    } else if check_hand_over_head(head, left_hand, thresholds) {
        Some(Posture::LeftHandOverHead)
    } else if check_hand_over_head(head, right_hand, thresholds) {
        Some(Posture::RightHandOverHead)
    } else if check_hello(head, left_hand, thresholds) {
        Some(Posture::LeftHello)
    } else if check_hello(head, right_hand, thresholds) {
        Some(Posture::RightHello)
    } else {
        None
    }
}

// ==============================================================================
// Algorithmic Posture Detector
// ==============================================================================

/// Runs extraction and classification for each frame and forwards the
/// outcome to a [`PostureSink`]: `report` on a match, `reset` otherwise.
pub struct AlgorithmicPostureDetector<S: PostureSink> {
    sink: S,
    thresholds: Thresholds,
    min_confidence: f32,
}

impl<S: PostureSink> AlgorithmicPostureDetector<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            thresholds: Thresholds::default(),
            min_confidence: MIN_JOINT_CONFIDENCE,
        }
    }

    pub fn with_config(sink: S, config: &Config) -> Self {
        Self {
            sink,
            thresholds: Thresholds::from(config),
            min_confidence: config.min_joint_confidence,
        }
    }

    /// Classify one frame and report the result to the sink
    pub fn track_postures(&mut self, frame: &SkeletonFrame) -> Option<Posture> {
        let joints = joint_extractor::extract_with_confidence(frame, self.min_confidence);
        let posture = classify_with(&joints, &self.thresholds);

        tracing::trace!(
            tracking_id = frame.tracking_id,
            timestamp = frame.timestamp,
            posture = posture.map(|p| p.as_str()),
            "classified frame"
        );

        match posture {
            Some(posture) => self.sink.report(posture),
            None => self.sink.reset(),
        }

        posture
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
