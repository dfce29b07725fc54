// Data models for skeleton frames and posture detection

pub mod posture;
pub mod skeleton;
