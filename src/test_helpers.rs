//! Shared test utilities for the filemerge test suite.
//!
//! Provides synthetic images with predictable pixels and small fixture
//! writers for filesystem tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let red = write_png(tmp.path(), "red.png", &solid_image(10, 10, RED));
//! let notes = write_text(tmp.path(), "notes.txt", "hello");
//! ```

use image::{DynamicImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const GREEN: [u8; 4] = [0, 255, 0, 255];
pub const BLUE: [u8; 4] = [0, 0, 255, 255];

// =========================================================================
// Synthetic images
// =========================================================================

/// Single-color RGBA image.
pub fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(rgba)))
}

/// Opaque image whose red channel follows x and green channel follows y.
///
/// Every pixel in a 256x256 window is distinct, so placement and cropping
/// mistakes show up as pixel mismatches.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    }))
}

/// Image with the left half `left` and the right half `right`.
pub fn split_image(width: u32, height: u32, left: [u8; 4], right: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 { Rgba(left) } else { Rgba(right) }
    }))
}

// =========================================================================
// Fixture files
// =========================================================================

/// Encode `image` as PNG under `dir/name` and return the path.
pub fn write_png(dir: &Path, name: &str, image: &DynamicImage) -> PathBuf {
    let path = dir.join(name);
    image
        .save_with_format(&path, image::ImageFormat::Png)
        .unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
    path
}

/// Write a text fixture under `dir/name` and return the path.
pub fn write_text(dir: &Path, name: &str, contents: &str) -> PathBuf {
    write_bytes(dir, name, contents.as_bytes())
}

/// Write raw bytes under `dir/name`, creating parent directories.
pub fn write_bytes(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents)
        .unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
    path
}

/// File names (not paths) in `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
