//! Algorithmic posture detection over tracked skeleton frames.
//!
//! Each frame goes through two stages: [`crate::core::joint_extractor`] picks out the
//! head and hand positions, and [`crate::core::posture_classifier`] turns them into at
//! most one [`Posture`]. The result is handed to a [`PostureSink`]; the
//! [`PostureDetector`] sink confirms postures that hold over consecutive frames
//! and notifies its observers.

pub mod core;
pub mod models;

pub use crate::core::config::Config;
pub use crate::core::joint_extractor::{extract, TrackedJoints};
pub use crate::core::posture_classifier::{classify, AlgorithmicPostureDetector, Thresholds};
pub use crate::core::posture_detector::{PostureDetector, PostureSink};
pub use crate::core::posture_tracker::{FrameSource, PostureTracker, TrackingStats, VecFrameSource};
pub use crate::models::posture::{Posture, PostureError, PostureEvent, PostureResult};
pub use crate::models::skeleton::{
    Joint, JointId, JointTrackingState, SkeletonFrame, SkeletonTrackingState, Vector3, Vector4,
};
