//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::{Config, InputMode};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.normalize.max_width == 0 {
            return Err(ConfigError::ValidationError(
                "normalize.max_width must be > 0".into(),
            ));
        }
        if !(1..=100).contains(&self.normalize.quality) {
            return Err(ConfigError::ValidationError(
                "normalize.quality must be between 1 and 100".into(),
            ));
        }
        if self.input.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "input.supported_formats must not be empty".into(),
            ));
        }
        if self.input.mode == InputMode::Upload && self.input.upload_dir.is_none() {
            return Err(ConfigError::ValidationError(
                "input.upload_dir is required when input.mode = \"upload\"".into(),
            ));
        }
        if self.vision.credentials_env.is_empty() {
            return Err(ConfigError::ValidationError(
                "vision.credentials_env must not be empty".into(),
            ));
        }
        if self.vision.timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "vision.timeout_secs must be > 0 when set".into(),
            ));
        }
        if self.describe.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "describe.timeout_secs must be > 0".into(),
            ));
        }
        if self.output.csv_path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "output.csv_path must not be empty".into(),
            ));
        }
        Ok(())
    }
}
