//! Image processing pipeline components.
//!
//! - **discovery**: Find image files at a path
//! - **normalize**: Downscale and re-encode files in place
//! - **processor**: Orchestrates normalize → tag → describe per image

pub mod discovery;
pub mod normalize;
pub mod processor;

// Re-exports for convenient access
pub use discovery::FileDiscovery;
pub use normalize::{NormalizeReport, Normalizer};
pub use processor::{MetadataPipeline, ProcessedImage};
