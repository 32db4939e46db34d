//! Core data types for the imgmeta pipeline.
//!
//! Provider calls produce tagged outcomes rather than bare strings. Each
//! outcome renders to the exact text that lands in the CSV, so the
//! placeholder wording lives in one place.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ProviderError;

pub const NO_TAGS: &str = "No tags found by Google Vision";
pub const TAGS_FAILED: &str = "Google Vision tags failed";

pub const NO_DESCRIPTION: &str = "No description available from Astica";
pub const DESCRIPTION_SKIPPED: &str =
    "Astica processing skipped (image not available for base64)";
pub const DESCRIPTION_NO_KEY: &str = "Astica API key not configured";
pub const DESCRIPTION_HTTP_FAILED: &str = "Astica API request failed (HTTP error)";
pub const DESCRIPTION_REQUEST_FAILED: &str =
    "Astica API request failed (Connection/Request error)";
pub const DESCRIPTION_BAD_JSON: &str = "Astica API response JSON decoding failed";
pub const DESCRIPTION_FAILED: &str =
    "Astica description processing failed (Unexpected error)";

/// One row of the exported CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Base name of the processed file
    #[serde(rename = "Filename")]
    pub filename: String,

    /// Caption text or a description placeholder
    #[serde(rename = "Description")]
    pub description: String,

    /// Comma-joined labels or a tags placeholder
    #[serde(rename = "Tags")]
    pub tags: String,
}

/// Result of a label-detection call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    /// Labels in the order the provider returned them
    Labels(Vec<String>),
    /// The provider answered but found nothing
    NoLabels,
    /// The call failed
    Failed(ProviderError),
}

impl TagOutcome {
    /// Build an outcome from a label list, mapping an empty list to `NoLabels`.
    pub fn from_labels(labels: Vec<String>) -> Self {
        if labels.is_empty() {
            Self::NoLabels
        } else {
            Self::Labels(labels)
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for TagOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Labels(labels) => f.write_str(&labels.join(", ")),
            Self::NoLabels => f.write_str(NO_TAGS),
            Self::Failed(_) => f.write_str(TAGS_FAILED),
        }
    }
}

/// Result of a description call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionOutcome {
    /// Trimmed, non-empty caption
    Caption(String),
    /// The provider answered without a usable caption
    NoCaption,
    /// The image bytes were not available, so no call was made
    Skipped,
    /// The call failed
    Failed(ProviderError),
}

impl DescriptionOutcome {
    /// Build an outcome from raw caption text, mapping blank text to `NoCaption`.
    pub fn from_caption(caption: &str) -> Self {
        let caption = caption.trim();
        if caption.is_empty() {
            Self::NoCaption
        } else {
            Self::Caption(caption.to_string())
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::Skipped)
    }
}

impl fmt::Display for DescriptionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Caption(text) => f.write_str(text),
            Self::NoCaption => f.write_str(NO_DESCRIPTION),
            Self::Skipped => f.write_str(DESCRIPTION_SKIPPED),
            Self::Failed(err) => match err {
                ProviderError::MissingApiKey => f.write_str(DESCRIPTION_NO_KEY),
                ProviderError::Http { .. } => f.write_str(DESCRIPTION_HTTP_FAILED),
                ProviderError::Connection(_) => f.write_str(DESCRIPTION_REQUEST_FAILED),
                ProviderError::MalformedJson(_) => f.write_str(DESCRIPTION_BAD_JSON),
                ProviderError::Service(msg) => write!(f, "Astica API error: {msg}"),
                ProviderError::Credentials(_) | ProviderError::Io(_) => {
                    f.write_str(DESCRIPTION_FAILED)
                }
            },
        }
    }
}

impl ImageRecord {
    /// Assemble a record from the two provider outcomes.
    pub fn new(
        filename: impl Into<String>,
        description: &DescriptionOutcome,
        tags: &TagOutcome,
    ) -> Self {
        Self {
            filename: filename.into(),
            description: description.to_string(),
            tags: tags.to_string(),
        }
    }
}
