//! File discovery for finding images at a user-supplied path.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::InputConfig;
use crate::error::PipelineError;

/// Discovers image files at a path.
pub struct FileDiscovery {
    supported_formats: Vec<String>,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: &InputConfig) -> Self {
        Self {
            supported_formats: config
                .supported_formats
                .iter()
                .map(|f| f.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Discover all supported image files at a path.
    ///
    /// A file is returned on its own if its extension is supported and
    /// rejected with `UnsupportedFormat` otherwise. A directory yields its
    /// supported direct children in listing order (not sorted, not
    /// recursive). An empty result is not an error.
    pub fn discover(&self, path: &Path) -> Result<Vec<PathBuf>, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        if path.is_file() {
            if self.is_supported(path) {
                return Ok(vec![path.to_path_buf()]);
            }
            return Err(PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("none")
                    .to_string(),
            });
        }

        if !path.is_dir() {
            return Err(PipelineError::NotAFileOrDirectory(path.to_path_buf()));
        }

        tracing::info!("Scanning directory: {}", path.display());

        let files = WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && self.is_supported(e.path()))
            .map(|e| e.into_path())
            .collect();

        Ok(files)
    }

    /// Check if a file has a supported extension.
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.supported_formats.iter().any(|fmt| *fmt == ext_lower)
            })
            .unwrap_or(false)
    }
}
