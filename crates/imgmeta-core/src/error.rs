//! Error types for the imgmeta pipeline.
//!
//! Errors are organized by stage so messages carry the relevant context
//! (file paths, stage names, specific issues). Provider failures have their
//! own type because they never abort a run: they are folded into the
//! per-image outcome and rendered into the CSV instead.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for imgmeta operations.
#[derive(Error, Debug)]
pub enum ImgmetaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Provider setup errors (e.g. an unusable service-account key)
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// The mandatory label-detection credential is unset or unusable
    #[error("{var} is not set or does not point to a readable file{}", .path.as_ref().map(|p| format!(" ({})", p.display())).unwrap_or_default())]
    MissingCredentials { var: String, path: Option<PathBuf> },
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input path does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Input path exists but is neither a regular file nor a directory
    #[error("Not a valid file or directory: {0}")]
    NotAFileOrDirectory(PathBuf),

    /// File extension is not one of the accepted image formats
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Re-encoding or writing the normalized image failed
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Staging an uploaded file failed
    #[error("Upload staging failed for {name}: {message}")]
    Upload { name: String, message: String },
}

/// Failure kinds reported by the tag and description providers.
///
/// Each kind maps to a distinct placeholder text in the exported CSV.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// No API key configured for the provider
    #[error("API key not configured")]
    MissingApiKey,

    /// Service-account credentials could not be loaded or exchanged
    #[error("credential error: {0}")]
    Credentials(String),

    /// The provider answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// DNS, connect, TLS or timeout failure before a response arrived
    #[error("request failed: {0}")]
    Connection(String),

    /// Response body was not the expected JSON
    #[error("malformed JSON response: {0}")]
    MalformedJson(String),

    /// The provider reported an error inside a successful response
    #[error("service error: {0}")]
    Service(String),

    /// Local read of the image failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl ProviderError {
    /// Map a `reqwest` send error to a provider failure kind.
    pub(crate) fn from_request(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Http {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None => Self::Connection(err.to_string()),
        }
    }
}

/// Convenience type alias for imgmeta results.
pub type Result<T> = std::result::Result<T, ImgmetaError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
