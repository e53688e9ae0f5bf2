//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the caller (CLI flags, config) and the layout engine
//! in [`compose`](super::compose), which does the pixel work.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 95). Clamped on construction.
//! - [`Sharpening`]: Unsharp-mask parameters (sigma + threshold) for the sharpen filter.
//! - [`ResizeMode`]: How each image is reconciled with the cell size (fit / fill / stretch).
//! - [`Layout`]: Arrangement strategy: vertical, horizontal or grid.
//! - [`Background`]: RGBA fill for padding and empty grid cells.
//! - [`LayoutOptions`]: Everything the engine needs besides the images themselves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Sharpening parameters for unsharp mask.
///
/// - `sigma`: Standard deviation of the Gaussian blur (higher = more sharpening)
/// - `threshold`: Minimum brightness difference to sharpen (0 = sharpen all pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sharpening {
    pub sigma: f32,
    pub threshold: i32,
}

impl Sharpening {
    /// Light sharpening, the default for the `sharpen` filter.
    pub fn light() -> Self {
        Self {
            sigma: 0.5,
            threshold: 0,
        }
    }
}

impl Default for Sharpening {
    fn default() -> Self {
        Self::light()
    }
}

/// Policy for reconciling an image's native aspect ratio with the cell size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Preserve aspect ratio, scale to fit inside the cell, pad with background.
    #[default]
    Fit,
    /// Preserve aspect ratio, scale to cover the cell, center-crop the overflow.
    Fill,
    /// Ignore aspect ratio, scale each axis to the exact cell size.
    Stretch,
}

impl ResizeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ResizeMode::Fit => "fit",
            ResizeMode::Fill => "fill",
            ResizeMode::Stretch => "stretch",
        }
    }
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResizeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fit" => Ok(ResizeMode::Fit),
            "fill" => Ok(ResizeMode::Fill),
            "stretch" => Ok(ResizeMode::Stretch),
            other => Err(format!(
                "unknown resize mode '{other}' (expected fit, fill or stretch)"
            )),
        }
    }
}

/// Arrangement strategy for the composite.
///
/// Grid rows and columns are optional: a missing value is derived from the
/// image count when the plan is computed (see
/// [`resolve_grid`](super::layout::resolve_grid)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    Vertical,
    Horizontal,
    Grid { rows: Option<u32>, cols: Option<u32> },
}

impl Layout {
    /// Grid with both dimensions auto-computed.
    pub fn auto_grid() -> Self {
        Layout::Grid {
            rows: None,
            cols: None,
        }
    }
}

/// The layout mode without grid dimensions, as written in config files and flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    #[default]
    Vertical,
    Horizontal,
    Grid,
}

impl LayoutKind {
    /// Combine with optional grid dimensions. Rows/cols are ignored for stacks.
    pub fn with_grid(self, rows: Option<u32>, cols: Option<u32>) -> Layout {
        match self {
            LayoutKind::Vertical => Layout::Vertical,
            LayoutKind::Horizontal => Layout::Horizontal,
            LayoutKind::Grid => Layout::Grid { rows, cols },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutKind::Vertical => "vertical",
            LayoutKind::Horizontal => "horizontal",
            LayoutKind::Grid => "grid",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vertical" | "v" => Ok(LayoutKind::Vertical),
            "horizontal" | "h" => Ok(LayoutKind::Horizontal),
            "grid" | "g" => Ok(LayoutKind::Grid),
            other => Err(format!(
                "unknown layout '{other}' (expected vertical, horizontal or grid)"
            )),
        }
    }
}

/// RGBA fill color for padding and empty grid cells.
///
/// Parsed from `#RRGGBB`, `#RRGGBBAA`, or one of the names `white`, `black`,
/// `transparent`. Serialized back as `#RRGGBBAA` (or `#RRGGBB` when opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Background(pub [u8; 4]);

impl Background {
    pub const WHITE: Background = Background([255, 255, 255, 255]);
    pub const BLACK: Background = Background([0, 0, 0, 255]);
    pub const TRANSPARENT: Background = Background([0, 0, 0, 0]);

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba(self.0)
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Background {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            "transparent" => return Ok(Self::TRANSPARENT),
            _ => {}
        }

        let hex = trimmed
            .strip_prefix('#')
            .ok_or_else(|| format!("invalid color '{s}': expected #RRGGBB or #RRGGBBAA"))?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(format!(
                "invalid color '{s}': expected 6 or 8 hex digits"
            ));
        }

        let mut channels = [255u8; 4];
        for (i, channel) in channels.iter_mut().enumerate().take(hex.len() / 2) {
            *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| format!("invalid color '{s}': non-hex digit"))?;
        }
        Ok(Background(channels))
    }
}

impl TryFrom<String> for Background {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Background> for String {
    fn from(bg: Background) -> Self {
        bg.to_string()
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

/// Everything the layout engine needs besides the images.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutOptions {
    pub layout: Layout,
    pub resize: ResizeMode,
    /// Explicit `(width, height)` for every cell. `None` derives it from the inputs.
    pub cell_size: Option<(u32, u32)>,
    pub background: Background,
}
