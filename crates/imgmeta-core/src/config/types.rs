//! Sub-configuration structs with their shipped defaults.

use serde::{Deserialize, Serialize};

/// Resize and re-encode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Images wider than this are downscaled to exactly this width
    pub max_width: u32,

    /// JPEG quality used when re-encoding (1-100)
    pub quality: u8,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            max_width: 1024,
            quality: 85,
        }
    }
}

/// How the list of input images is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// A local file or directory path
    #[default]
    Filesystem,
    /// Files dropped into an upload directory, staged into the working dir
    Upload,
}

/// Input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Which input source to use
    pub mode: InputMode,

    /// Directory holding uploaded files (upload mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_dir: Option<String>,

    /// Accepted image extensions (case-insensitive)
    pub supported_formats: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mode: InputMode::Filesystem,
            upload_dir: None,
            supported_formats: ["png", "jpg", "jpeg", "gif", "bmp", "tiff"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Google Cloud Vision label-detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Environment variable holding the service-account key file path
    pub credentials_env: String,

    /// `images:annotate` endpoint
    pub endpoint: String,

    /// OAuth scope requested for the access token
    pub scope: String,

    /// Maximum number of labels requested per image
    pub max_results: u32,

    /// Optional request timeout; unset means the HTTP client default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            credentials_env: "GOOGLE_APPLICATION_CREDENTIALS".to_string(),
            endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            scope: "https://www.googleapis.com/auth/cloud-vision".to_string(),
            max_results: 10,
            timeout_secs: None,
        }
    }
}

/// Astica description settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DescribeConfig {
    /// Describe endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model version sent with each request
    pub model_version: String,

    /// Vision parameters sent with each request
    pub vision_params: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for DescribeConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.astica.ai/describe".to_string(),
            api_key: "${ASTICA_API_KEY}".to_string(),
            model_version: "1.0_full".to_string(),
            vision_params: "describe".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// CSV file written at the end of a run
    pub csv_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "image_metadata.csv".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
