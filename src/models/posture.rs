// Data models for posture classification results, events and errors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// Postures
// ==============================================================================

/// The fixed set of postures the algorithmic detector recognizes.
/// A frame with no matching posture classifies to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Posture {
    HandsJoined,
    LeftHandOverHead,
    RightHandOverHead,
    LeftHello,
    RightHello,
}

impl Posture {
    pub const ALL: [Posture; 5] = [
        Posture::HandsJoined,
        Posture::LeftHandOverHead,
        Posture::RightHandOverHead,
        Posture::LeftHello,
        Posture::RightHello,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Posture::HandsJoined => "HandsJoined",
            Posture::LeftHandOverHead => "LeftHandOverHead",
            Posture::RightHandOverHead => "RightHandOverHead",
            Posture::LeftHello => "LeftHello",
            Posture::RightHello => "RightHello",
        }
    }

    pub fn from_name(name: &str) -> Option<Posture> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl fmt::Display for Posture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==============================================================================
// Posture Event (confirmed detection)
// ==============================================================================

/// Emitted to observers once a posture has held for the confirmation threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureEvent {
    pub id: Uuid,
    pub posture: Posture,
    pub detected_at: DateTime<Utc>,
}

impl PostureEvent {
    pub fn new(posture: Posture) -> Self {
        Self {
            id: Uuid::new_v4(),
            posture,
            detected_at: Utc::now(),
        }
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PostureError {
    #[error("Posture tracking not running")]
    NotTracking,

    #[error("Posture tracking already running")]
    AlreadyRunning,

    #[error("Frame channel closed")]
    ChannelClosed,

    #[error("Tracking worker failed: {0}")]
    WorkerFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Frame source error: {0}")]
    FrameSource(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type PostureResult<T> = Result<T, PostureError>;
