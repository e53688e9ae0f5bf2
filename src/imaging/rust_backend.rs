//! Pure Rust image I/O backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Decode (PNG, JPEG, BMP, GIF, TIFF, WebP, ICO) | `image::ImageReader` with format guessing |
//! | Encode → JPEG | `JpegEncoder::new_with_quality`, alpha flattened |
//! | Encode → WebP | `WebPEncoder::new_lossless` |
//! | Encode → PNG, BMP, GIF, TIFF, ICO | `DynamicImage::write_to` as RGBA8 |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

/// Input extensions paired with the decoder that handles them.
const IMAGE_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("bmp", ImageFormat::Bmp),
    ("gif", ImageFormat::Gif),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
    ("ico", ImageFormat::Ico),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    IMAGE_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Output format for a path, by lowercase extension.
pub fn output_format(path: &Path) -> Option<ImageFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_CANDIDATES
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, fmt)| *fmt)
}

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_failed(path: &Path, e: image::ImageError) -> BackendError {
    BackendError::ProcessingFailed(format!("Failed to encode {}: {}", path.display(), e))
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to read dimensions of {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Dimensions { width, height })
    }

    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "Failed to decode {}: {}",
                    path.display(),
                    e
                ))
            })
    }

    fn save(
        &self,
        image: &DynamicImage,
        path: &Path,
        quality: Quality,
    ) -> Result<(), BackendError> {
        let format = output_format(path).ok_or_else(|| {
            BackendError::ProcessingFailed(format!(
                "Unsupported output format: {}",
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("<none>")
            ))
        })?;

        // Encoded in memory; the file is only written once encoding succeeded.
        let mut writer = Cursor::new(Vec::new());
        match format {
            ImageFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
                let encoder = JpegEncoder::new_with_quality(&mut writer, quality.value() as u8);
                rgb.write_with_encoder(encoder)
                    .map_err(|e| encode_failed(path, e))?;
            }
            ImageFormat::WebP => {
                let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
                rgba.write_with_encoder(WebPEncoder::new_lossless(&mut writer))
                    .map_err(|e| encode_failed(path, e))?;
            }
            other => {
                let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
                rgba.write_to(&mut writer, other)
                    .map_err(|e| encode_failed(path, e))?;
            }
        }
        std::fs::write(path, writer.into_inner())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_image, solid_image};
    use image::GenericImageView;

    #[test]
    fn supported_extensions_match_decodable_formats() {
        let exts = super::supported_input_extensions();
        for expected in &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp", "ico"] {
            assert!(
                exts.contains(expected),
                "expected {expected} in supported extensions"
            );
        }
    }

    #[test]
    fn output_format_is_case_insensitive() {
        assert_eq!(output_format(Path::new("a.PNG")), Some(ImageFormat::Png));
        assert_eq!(output_format(Path::new("a.Jpeg")), Some(ImageFormat::Jpeg));
        assert_eq!(output_format(Path::new("a.avif")), None);
        assert_eq!(output_format(Path::new("noext")), None);
    }

    #[test]
    fn png_save_then_identify_and_load() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.png");
        let img = gradient_image(40, 25);

        let backend = RustBackend::new();
        backend.save(&img, &path, Quality::default()).unwrap();

        let dims = backend.identify(&path).unwrap();
        assert_eq!((dims.width, dims.height), (40, 25));
        // PNG is lossless
        assert_eq!(backend.load(&path).unwrap().to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn jpeg_save_drops_alpha() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.jpg");
        let img = solid_image(16, 16, [200, 10, 10, 100]);

        let backend = RustBackend::new();
        backend.save(&img, &path, Quality::new(80)).unwrap();

        let loaded = backend.load(&path).unwrap();
        assert_eq!(loaded.dimensions(), (16, 16));
        assert!(!loaded.color().has_alpha());
    }

    #[test]
    fn lossless_formats_roundtrip_dimensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = RustBackend::new();
        let img = gradient_image(32, 24);

        for ext in ["webp", "bmp", "tiff", "gif", "ico"] {
            let path = tmp.path().join(format!("out.{ext}"));
            backend.save(&img, &path, Quality::default()).unwrap();
            let dims = backend.identify(&path).unwrap();
            assert_eq!((dims.width, dims.height), (32, 24), "{ext}");
        }
    }

    #[test]
    fn load_ignores_misleading_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        let png = tmp.path().join("real.png");
        let renamed = tmp.path().join("actually_png.jpg");

        let backend = RustBackend::new();
        backend
            .save(&solid_image(5, 7, [9, 9, 9, 255]), &png, Quality::default())
            .unwrap();
        std::fs::rename(&png, &renamed).unwrap();

        assert_eq!(backend.load(&renamed).unwrap().dimensions(), (5, 7));
    }

    #[test]
    fn save_unsupported_format_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = RustBackend::new();
        let result = backend.save(
            &solid_image(4, 4, [0, 0, 0, 255]),
            &tmp.path().join("out.avif"),
            Quality::default(),
        );
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }

    #[test]
    fn failed_encode_leaves_no_file() {
        // ICO caps dimensions at 256, so this encode fails after format selection.
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("merged.ico");
        let backend = RustBackend::new();

        let result = backend.save(&solid_image(600, 300, [9, 9, 9, 255]), &output, Quality::default());

        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
        assert!(!output.exists());
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let backend = RustBackend::new();
        let result = backend.identify(Path::new("/nonexistent/image.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn load_corrupt_file_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let backend = RustBackend::new();
        assert!(matches!(
            backend.load(&path),
            Err(BackendError::ProcessingFailed(_))
        ));
    }
}
