//! Per-image pixel transforms applied before layout.
//!
//! Each step is a pure `DynamicImage -> DynamicImage` function; a [`Pipeline`]
//! runs them in order. Nothing here knows about cells or canvases.
//!
//! | Filter | Implementation |
//! |---|---|
//! | `grayscale` | `DynamicImage::grayscale`, alpha kept |
//! | `sepia` | fixed 3×3 color matrix per pixel |
//! | `blur` | `DynamicImage::blur` (Gaussian, sigma 2.0) |
//! | `sharpen` | `imageops::unsharpen` with [`Sharpening`] |
//! | `edge` | 3×3 Laplacian via `filter3x3` on RGB |
//!
//! Watermarks come after filters: [`TextWatermark`] draws white bitmap text
//! and [`ImageWatermark`] stamps a logo, both in the bottom-right corner.

use super::calculations::calculate_fit_dimensions;
use super::params::Sharpening;
use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const BLUR_SIGMA: f32 = 2.0;
const EDGE_KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];

/// Distance between the watermark and the bottom-right corner.
pub const WATERMARK_MARGIN: u32 = 20;

/// Named whole-image filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    None,
    Grayscale,
    Sepia,
    Blur,
    Sharpen,
    Edge,
}

impl Filter {
    pub fn as_str(self) -> &'static str {
        match self {
            Filter::None => "none",
            Filter::Grayscale => "grayscale",
            Filter::Sepia => "sepia",
            Filter::Blur => "blur",
            Filter::Sharpen => "sharpen",
            Filter::Edge => "edge",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Filter::None),
            "grayscale" | "greyscale" | "bw" => Ok(Filter::Grayscale),
            "sepia" => Ok(Filter::Sepia),
            "blur" => Ok(Filter::Blur),
            "sharpen" => Ok(Filter::Sharpen),
            "edge" | "edges" => Ok(Filter::Edge),
            other => Err(format!(
                "unknown filter '{other}' (expected none, grayscale, sepia, blur, sharpen or edge)"
            )),
        }
    }
}

/// Apply a single filter. `sharpening` is only consulted by [`Filter::Sharpen`].
pub fn apply_filter(image: DynamicImage, filter: Filter, sharpening: Sharpening) -> DynamicImage {
    match filter {
        Filter::None => image,
        Filter::Grayscale => DynamicImage::ImageRgba8(image.grayscale().to_rgba8()),
        Filter::Sepia => DynamicImage::ImageRgba8(sepia(&image.to_rgba8())),
        Filter::Blur => image.blur(BLUR_SIGMA),
        Filter::Sharpen => DynamicImage::ImageRgba8(imageops::unsharpen(
            &image.to_rgba8(),
            sharpening.sigma,
            sharpening.threshold,
        )),
        Filter::Edge => DynamicImage::ImageRgb8(image.to_rgb8()).filter3x3(&EDGE_KERNEL),
    }
}

fn sepia(image: &RgbaImage) -> RgbaImage {
    let mut out = image.clone();
    for px in out.pixels_mut() {
        let [r, g, b, a] = px.0.map(f32::from);
        let tone = |cr: f32, cg: f32, cb: f32| (cr * r + cg * g + cb * b).min(255.0) as u8;
        *px = Rgba([
            tone(0.393, 0.769, 0.189),
            tone(0.349, 0.686, 0.168),
            tone(0.272, 0.534, 0.131),
            a as u8,
        ]);
    }
    out
}

/// Image stamped onto the bottom-right corner of every input.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageWatermark {
    pub mark: RgbaImage,
    /// Multiplier for the mark's own alpha, `0.0..=1.0`.
    pub opacity: f32,
    pub margin: u32,
}

impl ImageWatermark {
    pub fn new(mark: DynamicImage, opacity: f32) -> Self {
        Self {
            mark: mark.to_rgba8(),
            opacity: opacity.clamp(0.0, 1.0),
            margin: WATERMARK_MARGIN,
        }
    }

    /// Stamp the mark onto `image`.
    ///
    /// A mark larger than the area inside the margins is scaled down to fit.
    /// Images too small to hold any mark are returned unchanged.
    pub fn apply(&self, image: DynamicImage) -> DynamicImage {
        let (img_w, img_h) = image.dimensions();
        let avail_w = img_w.saturating_sub(2 * self.margin);
        let avail_h = img_h.saturating_sub(2 * self.margin);
        let (mark_w, mark_h) = self.mark.dimensions();
        if avail_w == 0 || avail_h == 0 || mark_w == 0 || mark_h == 0 {
            return image;
        }

        let mark = if mark_w > avail_w || mark_h > avail_h {
            let (w, h) = calculate_fit_dimensions((mark_w, mark_h), (avail_w, avail_h));
            imageops::resize(&self.mark, w, h, FilterType::Lanczos3)
        } else {
            self.mark.clone()
        };
        let mark = fade(mark, self.opacity);

        let mut base = image.to_rgba8();
        let x = img_w - self.margin - mark.width();
        let y = img_h - self.margin - mark.height();
        imageops::overlay(&mut base, &mark, x as i64, y as i64);
        DynamicImage::ImageRgba8(base)
    }
}

fn fade(mut mark: RgbaImage, opacity: f32) -> RgbaImage {
    for px in mark.pixels_mut() {
        px.0[3] = (px.0[3] as f32 * opacity).round() as u8;
    }
    mark
}

/// Glyph height for a text watermark: 5% of the image width, clamped to
/// `12..=100` pixels.
///
/// ```
/// # use filemerge::imaging::transform::watermark_font_size;
/// assert_eq!(watermark_font_size(100), 12);
/// assert_eq!(watermark_font_size(800), 40);
/// assert_eq!(watermark_font_size(4000), 100);
/// ```
pub fn watermark_font_size(image_width: u32) -> u32 {
    (image_width / 20).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

const MIN_FONT_SIZE: u32 = 12;
const MAX_FONT_SIZE: u32 = 100;
const GLYPH_CELL: u32 = 8;

/// White text drawn in the bottom-right corner of every input.
///
/// Glyphs come from the built-in 8x8 bitmap font, scaled so each character
/// occupies a [`watermark_font_size`] square. Text wider than the image
/// runs off the left edge rather than being shrunk.
#[derive(Debug, Clone, PartialEq)]
pub struct TextWatermark {
    pub text: String,
    /// Text alpha as a fraction of opaque; `0.5` gives alpha 128.
    pub opacity: f32,
    pub margin: u32,
}

impl TextWatermark {
    pub fn new(text: impl Into<String>, opacity: f32) -> Self {
        Self {
            text: text.into(),
            opacity: opacity.clamp(0.0, 1.0),
            margin: WATERMARK_MARGIN,
        }
    }

    pub fn apply(&self, image: DynamicImage) -> DynamicImage {
        if self.text.is_empty() {
            return image;
        }
        let (img_w, img_h) = image.dimensions();
        let size = watermark_font_size(img_w);
        let alpha = (self.opacity * 255.0).round() as u8;
        let label = render_text(&self.text, size, alpha);

        let mut base = image.to_rgba8();
        let x = img_w as i64 - self.margin as i64 - label.width() as i64;
        let y = img_h as i64 - self.margin as i64 - label.height() as i64;
        imageops::overlay(&mut base, &label, x, y);
        DynamicImage::ImageRgba8(base)
    }
}

/// Rasterize `text` at 8px per glyph, then scale to `size` with nearest
/// neighbour so the bitmap edges stay hard.
fn render_text(text: &str, size: u32, alpha: u8) -> RgbaImage {
    let glyphs: Vec<[u8; 8]> = text
        .chars()
        .map(|ch| {
            BASIC_FONTS
                .get(ch)
                .or_else(|| BASIC_FONTS.get('?'))
                .unwrap_or([0; 8])
        })
        .collect();

    let count = glyphs.len() as u32;
    let mut cells = RgbaImage::new(GLYPH_CELL * count, GLYPH_CELL);
    for (i, glyph) in glyphs.iter().enumerate() {
        let left = i as u32 * GLYPH_CELL;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_CELL {
                // bit 0 is the leftmost pixel
                if (bits >> col) & 1 == 1 {
                    cells.put_pixel(left + col, row as u32, Rgba([255, 255, 255, alpha]));
                }
            }
        }
    }
    imageops::resize(&cells, size * count, size, FilterType::Nearest)
}

/// One step of a [`Pipeline`].
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    Filter(Filter, Sharpening),
    ImageWatermark(ImageWatermark),
    TextWatermark(TextWatermark),
}

impl Transform {
    pub fn apply(&self, image: DynamicImage) -> DynamicImage {
        match self {
            Transform::Filter(filter, sharpening) => apply_filter(image, *filter, *sharpening),
            Transform::ImageWatermark(mark) => mark.apply(image),
            Transform::TextWatermark(mark) => mark.apply(image),
        }
    }
}

/// Ordered list of transforms, applied front to back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    steps: Vec<Transform>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter step. `Filter::None` is skipped.
    pub fn filter(mut self, filter: Filter, sharpening: Sharpening) -> Self {
        if filter != Filter::None {
            self.steps.push(Transform::Filter(filter, sharpening));
        }
        self
    }

    pub fn image_watermark(mut self, mark: ImageWatermark) -> Self {
        self.steps.push(Transform::ImageWatermark(mark));
        self
    }

    /// Append a text watermark step. Empty text is skipped.
    pub fn text_watermark(mut self, mark: TextWatermark) -> Self {
        if !mark.text.is_empty() {
            self.steps.push(Transform::TextWatermark(mark));
        }
        self
    }

    pub fn steps(&self) -> &[Transform] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn apply(&self, image: DynamicImage) -> DynamicImage {
        self.steps.iter().fold(image, |img, step| step.apply(img))
    }
}
