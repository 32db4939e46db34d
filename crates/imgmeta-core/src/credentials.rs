//! Credential bootstrap from the process environment.

use std::path::PathBuf;

use crate::config::{expand_path, Config};
use crate::error::ConfigError;
use crate::providers::resolve_env_var;

/// Credentials resolved for one run.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Service-account key file for label detection
    pub vision_key_path: PathBuf,
    /// API key for captioning; the run continues without one
    pub astica_api_key: Option<String>,
}

impl Credentials {
    /// Resolve credentials from the environment.
    ///
    /// The label-detection key file is mandatory: an unset variable or a
    /// path that is not a file is an error. A missing captioning key only
    /// produces a warning.
    pub fn from_env(config: &Config) -> Result<Self, ConfigError> {
        let var = &config.vision.credentials_env;
        let raw = std::env::var(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingCredentials {
                var: var.clone(),
                path: None,
            })?;

        let vision_key_path = expand_path(raw.trim());
        if !vision_key_path.is_file() {
            return Err(ConfigError::MissingCredentials {
                var: var.clone(),
                path: Some(vision_key_path),
            });
        }
        tracing::info!(
            "Using Google credentials from {}: {}",
            var,
            vision_key_path.display()
        );

        let astica_api_key = resolve_env_var(&config.describe.api_key);
        if astica_api_key.is_none() {
            tracing::warn!(
                "Astica API key not set ({}). Descriptions will not be generated.",
                config.describe.api_key
            );
        }

        Ok(Self {
            vision_key_path,
            astica_api_key,
        })
    }
}
