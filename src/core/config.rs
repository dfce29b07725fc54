use crate::models::posture::{PostureError, PostureResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Posture detection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Consecutive matching frames before a posture is confirmed
    pub confirmation_frames: u32,
    /// Minimum joint confidence weight (0.0-1.0)
    pub min_joint_confidence: f32,
    /// Maximum distance between hands for HandsJoined (meters)
    pub hands_joined_epsilon: f32,
    /// Maximum per-axis hand/head offset (meters)
    pub max_range: f32,
    /// Frames buffered between the frame source and the tracking task
    pub frame_queue_capacity: usize,
    /// Confirmed posture events buffered per subscriber
    pub event_channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            confirmation_frames: 10,
            min_joint_confidence: 0.8,
            hands_joined_epsilon: 0.1,
            max_range: 0.25,
            frame_queue_capacity: 100,
            event_channel_capacity: 64,
        }
    }
}

impl Config {
    /// Load configuration from file, creating with defaults if it doesn't exist
    pub fn load() -> PostureResult<Self> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load and validate configuration from a specific file
    pub fn load_from(path: &Path) -> PostureResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> PostureResult<()> {
        self.save_to(&Self::get_config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> PostureResult<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> PostureResult<()> {
        if self.confirmation_frames == 0 || self.confirmation_frames > 300 {
            return Err(PostureError::InvalidConfig(format!(
                "Invalid confirmation frames: {}. Must be between 1 and 300",
                self.confirmation_frames
            )));
        }

        if !(0.0..=1.0).contains(&self.min_joint_confidence) {
            return Err(PostureError::InvalidConfig(format!(
                "Invalid joint confidence: {}. Must be between 0.0 and 1.0",
                self.min_joint_confidence
            )));
        }

        for (name, value) in [
            ("hands_joined_epsilon", self.hands_joined_epsilon),
            ("max_range", self.max_range),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PostureError::InvalidConfig(format!(
                    "Invalid {}: {}. Must be a positive distance",
                    name, value
                )));
            }
        }

        if self.frame_queue_capacity == 0 {
            return Err(PostureError::InvalidConfig(
                "Frame queue capacity cannot be zero".to_string(),
            ));
        }

        if self.event_channel_capacity == 0 {
            return Err(PostureError::InvalidConfig(
                "Event channel capacity cannot be zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Reset to default configuration
    pub fn reset() -> PostureResult<Self> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    /// Get the configuration file path
    fn get_config_path() -> PostureResult<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| {
                PostureError::InvalidConfig("Could not determine home directory".to_string())
            })?;

        let mut path = PathBuf::from(home);
        path.push(".posture_toolbox");
        path.push("config");
        path.push("settings.json");

        Ok(path)
    }
}
