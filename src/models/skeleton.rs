// Data models for tracked skeleton frames

use serde::{Deserialize, Serialize};
use std::ops::Sub;

// ==============================================================================
// Skeleton Frame
// ==============================================================================

/// One observation of a tracked body, as delivered by the capture or replay source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonFrame {
    pub tracking_id: i32,
    pub timestamp: i64, // Milliseconds, source-defined epoch
    pub tracking_state: SkeletonTrackingState,
    pub joints: Vec<Joint>,
}

impl SkeletonFrame {
    pub fn new(tracking_state: SkeletonTrackingState, joints: Vec<Joint>) -> Self {
        Self {
            tracking_id: 0,
            timestamp: 0,
            tracking_state,
            joints,
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.tracking_state == SkeletonTrackingState::Tracked
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkeletonTrackingState {
    NotTracked,
    PositionOnly,
    Tracked,
}

// ==============================================================================
// Joints (20 skeleton points)
// ==============================================================================

/// A single tracked skeletal point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub id: JointId,
    pub position: Vector4, // w carries the confidence weight
    pub tracking_state: JointTrackingState,
}

impl Joint {
    pub fn new(id: JointId, position: Vector4, tracking_state: JointTrackingState) -> Self {
        Self {
            id,
            position,
            tracking_state,
        }
    }

    /// A joint is usable only when fully tracked and at or above the confidence threshold
    pub fn is_usable(&self, min_confidence: f32) -> bool {
        self.tracking_state == JointTrackingState::Tracked && self.position.w >= min_confidence
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointTrackingState {
    NotTracked,
    Inferred,
    Tracked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointId {
    HipCenter,
    Spine,
    ShoulderCenter,
    Head,
    ShoulderLeft,
    ElbowLeft,
    WristLeft,
    HandLeft,
    ShoulderRight,
    ElbowRight,
    WristRight,
    HandRight,
    HipLeft,
    KneeLeft,
    AnkleLeft,
    FootLeft,
    HipRight,
    KneeRight,
    AnkleRight,
    FootRight,
}

impl JointId {
    pub fn to_string(&self) -> &'static str {
        match self {
            JointId::HipCenter => "hip_center",
            JointId::Spine => "spine",
            JointId::ShoulderCenter => "shoulder_center",
            JointId::Head => "head",
            JointId::ShoulderLeft => "shoulder_left",
            JointId::ElbowLeft => "elbow_left",
            JointId::WristLeft => "wrist_left",
            JointId::HandLeft => "hand_left",
            JointId::ShoulderRight => "shoulder_right",
            JointId::ElbowRight => "elbow_right",
            JointId::WristRight => "wrist_right",
            JointId::HandRight => "hand_right",
            JointId::HipLeft => "hip_left",
            JointId::KneeLeft => "knee_left",
            JointId::AnkleLeft => "ankle_left",
            JointId::FootLeft => "foot_left",
            JointId::HipRight => "hip_right",
            JointId::KneeRight => "knee_right",
            JointId::AnkleRight => "ankle_right",
            JointId::FootRight => "foot_right",
        }
    }
}

// ==============================================================================
// Shared: Vectors
// ==============================================================================

/// Sensor-space position in meters plus a confidence weight in `w`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vector4 {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn to_vector3(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }
}

/// Point in sensor space. Y is vertical, X horizontal, Z depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_subtraction_and_length() {
        let a = Vector3::new(1.0, 2.0, 2.0);
        let b = Vector3::new(1.0, 0.0, 0.0);
        let diff = a - b;
        assert_eq!(diff, Vector3::new(0.0, 2.0, 2.0));
        assert!((diff.length() - 8.0_f32.sqrt()).abs() < 1e-6);
        assert_eq!(Vector3::default().length(), 0.0);
    }

    #[test]
    fn test_vector4_drops_confidence() {
        let v = Vector4::new(0.1, 1.5, 2.0, 0.9);
        assert_eq!(v.to_vector3(), Vector3::new(0.1, 1.5, 2.0));
    }

    #[test]
    fn test_joint_usability_boundary() {
        let at_threshold = Joint::new(
            JointId::Head,
            Vector4::new(0.0, 0.0, 0.0, 0.8),
            JointTrackingState::Tracked,
        );
        assert!(at_threshold.is_usable(0.8));

        let below = Joint::new(
            JointId::Head,
            Vector4::new(0.0, 0.0, 0.0, 0.7999),
            JointTrackingState::Tracked,
        );
        assert!(!below.is_usable(0.8));

        let inferred = Joint::new(
            JointId::Head,
            Vector4::new(0.0, 0.0, 0.0, 1.0),
            JointTrackingState::Inferred,
        );
        assert!(!inferred.is_usable(0.8));
    }

    #[test]
    fn test_frame_serialization() {
        let frame = SkeletonFrame::new(
            SkeletonTrackingState::Tracked,
            vec![Joint::new(
                JointId::HandLeft,
                Vector4::new(0.1, 1.6, 0.05, 1.0),
                JointTrackingState::Tracked,
            )],
        );
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"hand_left\""));
        let deserialized: SkeletonFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(frame, deserialized);
        assert!(deserialized.is_tracked());
    }
}
