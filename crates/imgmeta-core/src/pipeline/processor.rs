//! Pipeline orchestration - runs each image through every stage in turn.

use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::error::ProviderError;
use crate::providers::{DescriptionProvider, ImageInput, TagProvider};
use crate::types::{DescriptionOutcome, ImageRecord, TagOutcome};

use super::normalize::Normalizer;

/// Everything produced for one image, before it is flattened to a record.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub filename: String,
    pub tags: TagOutcome,
    pub description: DescriptionOutcome,
}

impl ProcessedImage {
    pub fn record(&self) -> ImageRecord {
        ImageRecord::new(self.filename.clone(), &self.description, &self.tags)
    }
}

/// Normalize, tag and describe images one after another.
pub struct MetadataPipeline {
    normalizer: Normalizer,
    tagger: Box<dyn TagProvider>,
    describer: Box<dyn DescriptionProvider>,
}

impl MetadataPipeline {
    pub fn new(
        config: &Config,
        tagger: Box<dyn TagProvider>,
        describer: Box<dyn DescriptionProvider>,
    ) -> Self {
        Self {
            normalizer: Normalizer::new(config.normalize.clone()),
            tagger,
            describer,
        }
    }

    /// Process a single image: normalize in place, then tag, then describe.
    ///
    /// Never fails. A normalization failure is logged and the providers
    /// still see whatever bytes are on disk; unreadable bytes show up as
    /// failed or skipped outcomes.
    pub async fn process(&self, path: &Path) -> ProcessedImage {
        let start = Instant::now();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        tracing::info!("Processing image: {}...", filename);

        match self.normalizer.normalize(path).await {
            Ok(report) => tracing::info!(
                "Compressed {}: {} bytes -> {} bytes",
                filename,
                report.original_bytes,
                report.normalized_bytes
            ),
            Err(e) => tracing::error!("Error compressing image {}: {e}", filename),
        }

        let bytes = tokio::fs::read(path).await;

        let tags = match &bytes {
            Ok(bytes) => self.tagger.detect_labels(bytes).await,
            Err(e) => {
                tracing::error!("Cannot read {} for tagging: {e}", path.display());
                TagOutcome::Failed(ProviderError::Io(e.to_string()))
            }
        };

        let description = match &bytes {
            Ok(_) if !self.describer.is_configured() => {
                tracing::error!(
                    "{} API key not configured, no description for {}",
                    self.describer.name(),
                    filename
                );
                DescriptionOutcome::Failed(ProviderError::MissingApiKey)
            }
            Ok(bytes) => self.describer.describe(&ImageInput::from_bytes(bytes)).await,
            Err(_) => {
                tracing::warn!(
                    "Skipping {} for {} due to base64 conversion failure",
                    self.describer.name(),
                    filename
                );
                DescriptionOutcome::Skipped
            }
        };

        tracing::debug!("Processed {} in {:?}", filename, start.elapsed());

        ProcessedImage {
            filename,
            tags,
            description,
        }
    }

    /// Process every path in order and collect one record per path.
    ///
    /// `on_record` is called after each image, e.g. to print a summary.
    pub async fn run<F>(&self, paths: &[impl AsRef<Path>], mut on_record: F) -> Vec<ImageRecord>
    where
        F: FnMut(&ProcessedImage),
    {
        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let processed = self.process(path.as_ref()).await;
            on_record(&processed);
            records.push(processed.record());
        }
        records
    }
}
