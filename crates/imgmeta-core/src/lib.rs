//! imgmeta core - tag and caption batches of images.
//!
//! Each image is downscaled in place, sent to a label-detection service for
//! tags and to a captioning service for a description, and the results are
//! collected into CSV rows.
//!
//! # Architecture
//!
//! ```text
//! InputSource → Normalize → Tags (Vision) → Description (Astica) → CSV
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use imgmeta_core::{export_csv, AsticaClient, Config, Credentials, MetadataPipeline, VisionClient};
//!
//! #[tokio::main]
//! async fn main() -> imgmeta_core::Result<()> {
//!     let config = Config::load()?;
//!     let creds = Credentials::from_env(&config)?;
//!     let tagger = VisionClient::from_key_file(&config.vision, &creds.vision_key_path)?;
//!     let describer = AsticaClient::with_api_key(&config.describe, creds.astica_api_key);
//!     let pipeline = MetadataPipeline::new(&config, Box::new(tagger), Box::new(describer));
//!
//!     let records = pipeline.run(&["./image.jpg"], |_| {}).await;
//!     export_csv(&config.csv_path(), &records)?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod credentials;
pub mod error;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod providers;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use credentials::Credentials;
pub use error::{ConfigError, ImgmetaError, PipelineError, PipelineResult, ProviderError, Result};
pub use input::{FilesystemSource, InputSource, UploadSource};
pub use output::{export_csv, CsvExporter};
pub use pipeline::{FileDiscovery, MetadataPipeline, Normalizer, ProcessedImage};
pub use providers::{AsticaClient, DescriptionProvider, TagProvider, VisionClient};
pub use types::{DescriptionOutcome, ImageRecord, TagOutcome};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
