//! Input sources: where the list of images for a run comes from.
//!
//! `FilesystemSource` resolves a user-supplied file or directory.
//! `UploadSource` takes files dropped into an upload directory, stages
//! copies into a scratch directory (normalization rewrites files in place)
//! and removes them again once the run is over.

use std::path::{Path, PathBuf};

use crate::config::{Config, InputConfig, InputMode};
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::FileDiscovery;

/// A provider of image paths for one run.
pub trait InputSource {
    /// Short label for logs.
    fn describe(&self) -> String;

    /// Produce the ordered list of image paths to process.
    fn acquire(&mut self) -> PipelineResult<Vec<PathBuf>>;

    /// Release anything `acquire` created. Safe to call more than once.
    fn cleanup(&mut self) {}
}

/// Images from a local file or directory.
pub struct FilesystemSource {
    path: PathBuf,
    discovery: FileDiscovery,
}

impl FilesystemSource {
    pub fn new(path: impl Into<PathBuf>, config: &InputConfig) -> Self {
        Self {
            path: path.into(),
            discovery: FileDiscovery::new(config),
        }
    }
}

impl InputSource for FilesystemSource {
    fn describe(&self) -> String {
        format!("path {}", self.path.display())
    }

    fn acquire(&mut self) -> PipelineResult<Vec<PathBuf>> {
        self.discovery.discover(&self.path)
    }
}

/// Images uploaded into a directory, staged into a scratch directory.
pub struct UploadSource {
    upload_dir: PathBuf,
    staging_dir: PathBuf,
    discovery: FileDiscovery,
    staged: Vec<PathBuf>,
    created_staging_dir: bool,
}

impl UploadSource {
    pub fn new(
        upload_dir: impl Into<PathBuf>,
        staging_dir: impl Into<PathBuf>,
        config: &InputConfig,
    ) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            staging_dir: staging_dir.into(),
            discovery: FileDiscovery::new(config),
            staged: Vec::new(),
            created_staging_dir: false,
        }
    }

    fn stage(&self, source: &Path) -> PipelineResult<PathBuf> {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let target = self.staging_dir.join(&name);

        // Never stage over a file this run did not create; cleanup deletes
        // everything that was staged.
        let mut dest = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(PipelineError::Upload {
                    message: format!("{} already exists, not overwriting", target.display()),
                    name,
                });
            }
            Err(e) => {
                return Err(PipelineError::Upload {
                    name,
                    message: e.to_string(),
                })
            }
        };

        let copied =
            std::fs::File::open(source).and_then(|mut src| std::io::copy(&mut src, &mut dest));
        if let Err(e) = copied {
            let _ = std::fs::remove_file(&target);
            return Err(PipelineError::Upload {
                name,
                message: e.to_string(),
            });
        }
        Ok(target)
    }
}

impl InputSource for UploadSource {
    fn describe(&self) -> String {
        format!("uploads in {}", self.upload_dir.display())
    }

    fn acquire(&mut self) -> PipelineResult<Vec<PathBuf>> {
        if !self.upload_dir.is_dir() {
            return Err(PipelineError::FileNotFound(self.upload_dir.clone()));
        }
        let uploads = self.discovery.discover(&self.upload_dir)?;
        if uploads.is_empty() {
            return Ok(Vec::new());
        }

        if !self.staging_dir.exists() {
            std::fs::create_dir_all(&self.staging_dir).map_err(|e| PipelineError::Upload {
                name: self.staging_dir.display().to_string(),
                message: e.to_string(),
            })?;
            self.created_staging_dir = true;
        }

        for upload in uploads {
            match self.stage(&upload) {
                Ok(path) => {
                    tracing::info!("Temporarily saved uploaded file: {}", path.display());
                    self.staged.push(path);
                }
                Err(e) => tracing::error!("{e}"),
            }
        }
        Ok(self.staged.clone())
    }

    fn cleanup(&mut self) {
        for path in self.staged.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::info!("Cleaned up: {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Error cleaning up {}: {e}", path.display()),
            }
        }
        if self.created_staging_dir {
            // Only removes the directory if nothing else was put there.
            let _ = std::fs::remove_dir(&self.staging_dir);
            self.created_staging_dir = false;
        }
    }
}

impl Drop for UploadSource {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Pick the input source for a run from the configured mode.
///
/// `path` is only used in filesystem mode; `staging_dir` only in upload mode.
pub fn source_for(
    config: &Config,
    path: Option<PathBuf>,
    staging_dir: PathBuf,
) -> PipelineResult<Box<dyn InputSource>> {
    match config.input.mode {
        InputMode::Filesystem => {
            let path = path.ok_or_else(|| PipelineError::FileNotFound(PathBuf::new()))?;
            Ok(Box::new(FilesystemSource::new(path, &config.input)))
        }
        InputMode::Upload => {
            let upload_dir = config
                .upload_dir()
                .ok_or_else(|| PipelineError::FileNotFound(PathBuf::from("<upload_dir>")))?;
            Ok(Box::new(UploadSource::new(
                upload_dir,
                staging_dir,
                &config.input,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filesystem_source_lists_images() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"x").unwrap();

        let mut source = FilesystemSource::new(dir.path(), &InputConfig::default());
        assert_eq!(source.acquire().unwrap(), vec![dir.path().join("a.jpg")]);
    }

    #[test]
    fn test_upload_source_stages_and_cleans_up() {
        let uploads = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let staging = work.path().join("staging");
        std::fs::write(uploads.path().join("beach.png"), b"png-bytes").unwrap();
        std::fs::write(uploads.path().join("list.csv"), b"a,b").unwrap();

        let mut source = UploadSource::new(uploads.path(), &staging, &InputConfig::default());
        let staged = source.acquire().unwrap();

        assert_eq!(staged, vec![staging.join("beach.png")]);
        assert_eq!(std::fs::read(&staged[0]).unwrap(), b"png-bytes");

        source.cleanup();
        assert!(!staged[0].exists());
        assert!(!staging.exists());
        // Originals are never touched.
        assert!(uploads.path().join("beach.png").exists());
    }

    #[test]
    fn test_upload_cleanup_keeps_existing_staging_dir() {
        let uploads = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        std::fs::write(uploads.path().join("x.jpg"), b"x").unwrap();
        std::fs::write(work.path().join("keep.txt"), b"mine").unwrap();

        {
            let mut source =
                UploadSource::new(uploads.path(), work.path(), &InputConfig::default());
            source.acquire().unwrap();
            assert!(work.path().join("x.jpg").exists());
        } // dropped here

        assert!(!work.path().join("x.jpg").exists());
        assert!(work.path().join("keep.txt").exists());
    }

    #[test]
    fn test_upload_never_replaces_existing_file() {
        let uploads = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        std::fs::write(uploads.path().join("x.jpg"), b"uploaded").unwrap();
        std::fs::write(uploads.path().join("y.jpg"), b"other").unwrap();
        std::fs::write(work.path().join("x.jpg"), b"USER FILE").unwrap();

        {
            let mut source =
                UploadSource::new(uploads.path(), work.path(), &InputConfig::default());
            let staged = source.acquire().unwrap();
            assert_eq!(staged, vec![work.path().join("y.jpg")]);
        }

        assert_eq!(std::fs::read(work.path().join("x.jpg")).unwrap(), b"USER FILE");
        assert!(!work.path().join("y.jpg").exists());
    }

    #[test]
    fn test_empty_upload_dir() {
        let uploads = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let staging = work.path().join("staging");

        let mut source = UploadSource::new(uploads.path(), &staging, &InputConfig::default());
        assert!(source.acquire().unwrap().is_empty());
        assert!(!staging.exists());
    }

    #[test]
    fn test_missing_upload_dir() {
        let mut source = UploadSource::new(
            "/no/such/uploads",
            "/tmp/unused",
            &InputConfig::default(),
        );
        assert!(matches!(
            source.acquire(),
            Err(PipelineError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_source_for_selects_by_mode() {
        let mut config = Config::default();
        let fs = source_for(&config, Some(PathBuf::from("photos")), PathBuf::from("s")).unwrap();
        assert!(fs.describe().starts_with("path"));

        config.input.mode = InputMode::Upload;
        config.input.upload_dir = Some("/srv/inbox".to_string());
        let up = source_for(&config, None, PathBuf::from("s")).unwrap();
        assert_eq!(up.describe(), "uploads in /srv/inbox");
    }
}
