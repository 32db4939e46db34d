//! In-place downscale and re-encode of image files.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::config::NormalizeConfig;
use crate::error::PipelineError;

/// Resizes images wider than the configured maximum and rewrites them.
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: NormalizeConfig,
}

/// What a normalization pass did to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeReport {
    pub original_bytes: u64,
    pub normalized_bytes: u64,
    pub original_width: u32,
    pub original_height: u32,
    pub width: u32,
    pub height: u32,
}

impl NormalizeReport {
    /// Whether the pass changed the pixel dimensions.
    pub fn resized(&self) -> bool {
        self.width != self.original_width || self.height != self.original_height
    }
}

impl Normalizer {
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    /// Normalize a file in place on the blocking pool.
    pub async fn normalize(&self, path: &Path) -> Result<NormalizeReport, PipelineError> {
        let this = self.clone();
        let path_owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || this.normalize_sync(&path_owned))
            .await
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            })?
    }

    /// Synchronous normalize. The file is only overwritten after the new
    /// encoding has been produced in memory.
    pub fn normalize_sync(&self, path: &Path) -> Result<NormalizeReport, PipelineError> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PipelineError::FileNotFound(path.to_path_buf()),
            _ => PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot read file: {}", e),
            },
        })?;
        let original_bytes = bytes.len() as u64;

        let (image, format) = Self::decode(bytes, path)?;
        let (original_width, original_height) = image.dimensions();

        let image = if original_width > self.config.max_width {
            let (w, h) =
                target_dimensions(original_width, original_height, self.config.max_width);
            tracing::debug!(
                "Resizing {}: {}x{} -> {}x{}",
                path.display(),
                original_width,
                original_height,
                w,
                h
            );
            image.resize_exact(w, h, FilterType::Lanczos3)
        } else {
            image
        };
        let (width, height) = image.dimensions();

        let encoded = self.encode(&image, format).map_err(|e| PipelineError::Encode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        std::fs::write(path, &encoded).map_err(|e| PipelineError::Encode {
            path: path.to_path_buf(),
            message: format!("Cannot write file: {}", e),
        })?;

        Ok(NormalizeReport {
            original_bytes,
            normalized_bytes: encoded.len() as u64,
            original_width,
            original_height,
            width,
            height,
        })
    }

    fn decode(bytes: Vec<u8>, path: &Path) -> Result<(DynamicImage, ImageFormat), PipelineError> {
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = match reader.format() {
            Some(f) => f,
            None => ImageFormat::from_path(path).map_err(|_| PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            })?,
        };
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok((image, format))
    }

    /// Encode in the file's own format. JPEG honours the configured quality;
    /// PNG uses the strongest compression.
    fn encode(&self, image: &DynamicImage, format: ImageFormat) -> image::ImageResult<Vec<u8>> {
        let mut buffer = Vec::new();
        match format {
            ImageFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buffer, self.config.quality);
                match image.color() {
                    ColorType::L8 | ColorType::Rgb8 => image.write_with_encoder(encoder)?,
                    _ => DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?,
                }
            }
            ImageFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut buffer,
                    CompressionType::Best,
                    PngFilter::Adaptive,
                );
                image.write_with_encoder(encoder)?;
            }
            other => image.write_to(&mut Cursor::new(&mut buffer), other)?,
        }
        Ok(buffer)
    }
}

/// Dimensions after scaling `width` down to `max_width`, keeping aspect ratio.
///
/// Height is truncated toward zero and never drops below 1.
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }
    let scaled = (height as u64 * max_width as u64) / width as u64;
    (max_width, (scaled as u32).max(1))
}
