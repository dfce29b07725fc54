pub mod config;

// Per-frame classification
pub mod joint_extractor;
pub mod posture_classifier;

// Confirmation and frame pumping
pub mod posture_detector;
pub mod posture_tracker;
