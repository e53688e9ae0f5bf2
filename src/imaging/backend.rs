//! Image I/O backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the three operations the merge pipeline
//! needs from the outside world: identify (header-only dimensions), load
//! (full decode) and save (encode by extension).
//!
//! Layout, resizing and filters never go through the backend. They operate
//! on decoded [`DynamicImage`]s in memory, so the production
//! [`RustBackend`](super::rust_backend::RustBackend) and the test mock only
//! differ in where pixels come from and where they go.

use super::params::Quality;
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<Dimensions> for (u32, u32) {
    fn from(d: Dimensions) -> Self {
        (d.width, d.height)
    }
}

/// Trait for image I/O backends.
pub trait ImageBackend {
    /// Get image dimensions without decoding pixel data.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode an image from disk.
    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Encode `image` to `path`. The format follows the file extension;
    /// `quality` only affects lossy formats.
    fn save(&self, image: &DynamicImage, path: &Path, quality: Quality)
    -> Result<(), BackendError>;
}
