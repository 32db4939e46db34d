//! Provider traits for label detection and captioning.
//!
//! The pipeline only sees these traits, so tests can swap in canned
//! providers and the binary can wire up the real HTTP clients.

use async_trait::async_trait;
use base64::Engine;

use crate::types::{DescriptionOutcome, TagOutcome};

/// Base64-encoded image ready to send to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    /// Standard base64 (with padding) of the raw file bytes
    pub data: String,
}

impl ImageInput {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }
}

/// Something that returns descriptive labels for an image.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn TagProvider>` for dynamic dispatch).
#[async_trait]
pub trait TagProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Detect labels for the raw image bytes. Never fails: errors are
    /// reported through `TagOutcome::Failed`.
    async fn detect_labels(&self, image: &[u8]) -> TagOutcome;
}

/// Something that returns a natural-language caption for an image.
#[async_trait]
pub trait DescriptionProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Whether an API key is available. Without one every call reports
    /// `ProviderError::MissingApiKey`.
    fn is_configured(&self) -> bool;

    /// Caption a base64-encoded image. Never fails: errors are reported
    /// through `DescriptionOutcome::Failed`.
    async fn describe(&self, image: &ImageInput) -> DescriptionOutcome;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.trim().is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
