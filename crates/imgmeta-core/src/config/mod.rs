//! Configuration management for imgmeta.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default` with the values the tool
//! has always shipped with (1024 px, quality 85, 30 s, `image_metadata.csv`).

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for imgmeta.
///
/// Built once per run and handed by reference to each component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resize / re-encode settings
    pub normalize: NormalizeConfig,

    /// Where images come from
    pub input: InputConfig,

    /// Label-detection provider settings
    pub vision: VisionConfig,

    /// Description provider settings
    pub describe: DescribeConfig,

    /// CSV output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.imgmeta.imgmeta/config.toml
    /// - Linux: ~/.config/imgmeta/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\imgmeta\config\config.toml
    ///
    /// Falls back to ~/.imgmeta/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "imgmeta", "imgmeta")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".imgmeta").join("config.toml")
            })
    }

    /// Resolved CSV output path (with ~ expansion).
    pub fn csv_path(&self) -> PathBuf {
        expand_path(&self.output.csv_path)
    }

    /// Resolved upload directory, if one is configured.
    pub fn upload_dir(&self) -> Option<PathBuf> {
        self.input.upload_dir.as_deref().map(expand_path)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
