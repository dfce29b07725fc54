// Joint extraction - picks the head and both hands out of a skeleton frame

use crate::models::skeleton::{JointId, SkeletonFrame, Vector3};

/// Minimum confidence weight for a joint to take part in classification
pub const MIN_JOINT_CONFIDENCE: f32 = 0.8;

/// Positions of the joints the posture classifier looks at.
/// Each slot is `None` when no usable joint of that kind was seen.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackedJoints {
    pub head: Option<Vector3>,
    pub left_hand: Option<Vector3>,
    pub right_hand: Option<Vector3>,
}

/// Extract head and hand positions using the default confidence threshold
pub fn extract(frame: &SkeletonFrame) -> TrackedJoints {
    extract_with_confidence(frame, MIN_JOINT_CONFIDENCE)
}

/// Extract head and hand positions, discarding joints below `min_confidence`
/// or not fully tracked. Untracked frames yield no positions at all.
pub fn extract_with_confidence(frame: &SkeletonFrame, min_confidence: f32) -> TrackedJoints {
    let mut joints = TrackedJoints::default();

    if !frame.is_tracked() {
        return joints;
    }

    for joint in frame.joints.iter().filter(|j| j.is_usable(min_confidence)) {
        match joint.id {
            JointId::Head => joints.head = Some(joint.position.to_vector3()),
            JointId::HandLeft => joints.left_hand = Some(joint.position.to_vector3()),
            JointId::HandRight => joints.right_hand = Some(joint.position.to_vector3()),
            _ => {}
        }
    }

    joints
}
