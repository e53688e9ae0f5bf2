//! Merge configuration module.
//!
//! Handles loading, validating, and merging `filemerge.toml`. Stock defaults
//! are the base layer; a user file overrides any subset of keys, and CLI
//! flags override both.
//!
//! ## Config File Location
//!
//! `filemerge.toml` in the working directory is picked up automatically.
//! `--config FILE` loads a file from anywhere instead (it must exist).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [images]
//! layout = "vertical"       # vertical | horizontal | grid
//! # rows = 2                # grid only; derived from cols when absent
//! # cols = 3                # grid only; derived from rows when absent
//! resize = "fit"            # fit | fill | stretch
//! # cell_size = [800, 600]  # derived from the largest input when absent
//! background = "#ffffff"    # #RRGGBB, #RRGGBBAA, white, black, transparent
//! quality = 95              # JPEG quality (1-100)
//! filter = "none"           # none | grayscale | sepia | blur | sharpen | edge
//! sharpen_sigma = 0.5
//! sharpen_threshold = 0
//! # watermark = "Copyright 2025"   # text, bottom-right
//! # watermark_image = "logo.png"
//! watermark_opacity = 0.5
//! skip_invalid = true
//!
//! [text]
//! separator = "simple"      # simple | fancy | minimal | none
//! line_numbers = false
//! metadata = false
//! strip_whitespace = false
//! markdown = false
//!
//! [json]
//! mode = "array"            # array | object
//!
//! [csv]
//! source_column = true      # append a source_file column
//!
//! [output]
//! directory = "output"
//! timestamp = true
//! backup = true
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{
    Background, Filter, Layout, LayoutKind, LayoutOptions, Quality, ResizeMode, Sharpening,
    TextWatermark,
};
use crate::text::{JsonMode, SeparatorStyle, TextOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "filemerge.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `filemerge.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    /// Image merge settings (layout, resize, filters, encoding).
    pub images: ImagesConfig,
    /// Text merge settings (separators, numbering, metadata).
    pub text: TextConfig,
    pub json: JsonConfig,
    pub csv: CsvConfig,
    /// Where and how results are written.
    pub output: OutputConfig,
}

impl MergeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let images = &self.images;
        if !(1..=100).contains(&images.quality) {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if images.rows == Some(0) || images.cols == Some(0) {
            return Err(ConfigError::Validation(
                "images.rows and images.cols must be at least 1".into(),
            ));
        }
        if matches!(images.cell_size, Some([0, _] | [_, 0])) {
            return Err(ConfigError::Validation(
                "images.cell_size values must be non-zero".into(),
            ));
        }
        if !(0.0..=1.0).contains(&images.watermark_opacity) {
            return Err(ConfigError::Validation(
                "images.watermark_opacity must be between 0.0 and 1.0".into(),
            ));
        }
        if !(images.sharpen_sigma.is_finite() && images.sharpen_sigma > 0.0) {
            return Err(ConfigError::Validation(
                "images.sharpen_sigma must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Image merge settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    pub layout: LayoutKind,
    /// Grid rows. Only used with `layout = "grid"`.
    pub rows: Option<u32>,
    /// Grid columns. Only used with `layout = "grid"`.
    pub cols: Option<u32>,
    pub resize: ResizeMode,
    /// Explicit `[width, height]` for every cell.
    pub cell_size: Option<[u32; 2]>,
    /// Fill for padding and empty grid cells.
    pub background: Background,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    pub filter: Filter,
    pub sharpen_sigma: f32,
    pub sharpen_threshold: i32,
    /// Text drawn in white onto the bottom-right corner of every input.
    pub watermark: Option<String>,
    /// Image stamped onto the bottom-right corner of every input.
    pub watermark_image: Option<PathBuf>,
    /// Alpha of both watermarks; `0.5` is the classic half-transparent text.
    pub watermark_opacity: f32,
    /// Leave undecodable inputs out instead of failing the merge.
    pub skip_invalid: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            layout: LayoutKind::Vertical,
            rows: None,
            cols: None,
            resize: ResizeMode::Fit,
            cell_size: None,
            background: Background::WHITE,
            quality: 95,
            filter: Filter::None,
            sharpen_sigma: 0.5,
            sharpen_threshold: 0,
            watermark: None,
            watermark_image: None,
            watermark_opacity: 0.5,
            skip_invalid: true,
        }
    }
}

impl ImagesConfig {
    pub fn layout(&self) -> Layout {
        self.layout.with_grid(self.rows, self.cols)
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            layout: self.layout(),
            resize: self.resize,
            cell_size: self.cell_size.map(|[w, h]| (w, h)),
            background: self.background,
        }
    }

    pub fn sharpening(&self) -> Sharpening {
        Sharpening {
            sigma: self.sharpen_sigma,
            threshold: self.sharpen_threshold,
        }
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }

    /// The configured text watermark, if any non-empty text is set.
    pub fn text_watermark(&self) -> Option<TextWatermark> {
        self.watermark
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(|text| TextWatermark::new(text, self.watermark_opacity))
    }
}

/// Text merge settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    pub separator: SeparatorStyle,
    pub line_numbers: bool,
    /// Prepend file name, size and timestamps to each block.
    pub metadata: bool,
    pub strip_whitespace: bool,
    /// Emit a markdown document instead of separator blocks.
    pub markdown: bool,
}

impl TextConfig {
    pub fn options(&self) -> TextOptions {
        TextOptions {
            separator: self.separator,
            line_numbers: self.line_numbers,
            metadata: self.metadata,
            strip_whitespace: self.strip_whitespace,
            markdown: self.markdown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JsonConfig {
    pub mode: JsonMode,
}

/// CSV merge settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvConfig {
    /// Append a `source_file` column naming the file each row came from.
    pub source_column: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            source_column: true,
        }
    }
}

/// Output placement settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory that bare output names are written into.
    pub directory: PathBuf,
    /// Append `_YYYYMMDD_HHMMSS` to output names.
    pub timestamp: bool,
    /// Copy an existing output aside before overwriting it.
    pub backup: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            timestamp: true,
            backup: true,
        }
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(MergeConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<MergeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: MergeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `filemerge.toml` from the given directory, or the stock defaults if
/// there is none.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<MergeConfig, ConfigError> {
    let overlay = load_raw_config(&dir.join(CONFIG_FILE_NAME))?;
    resolve_config(stock_defaults_value()?, overlay)
}

/// Load an explicitly named config file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<MergeConfig, ConfigError> {
    let overlay =
        load_raw_config(path)?.ok_or_else(|| ConfigError::NotFound(path.to_path_buf()))?;
    resolve_config(stock_defaults_value()?, Some(overlay))
}

/// Returns a fully-commented stock `filemerge.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# filemerge Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as filemerge.toml in the directory you run filemerge from,
# or pass it explicitly with --config. Command-line flags override it.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Image merging
# ---------------------------------------------------------------------------
[images]
# How inputs are arranged: "vertical" (one column), "horizontal" (one row)
# or "grid".
layout = "vertical"

# Grid shape. Leave both out for a near-square grid; give one and the other
# is derived from the number of images.
# rows = 2
# cols = 3

# How each image is made to match the cell size:
#   "fit"     - keep aspect ratio, pad with the background color
#   "fill"    - keep aspect ratio, crop the overflow from the center
#   "stretch" - ignore aspect ratio
resize = "fit"

# Cell size as [width, height]. When absent, the widest and the tallest
# input decide it.
# cell_size = [800, 600]

# Padding and empty-cell color: "#RRGGBB", "#RRGGBBAA", "white", "black"
# or "transparent".
background = "#ffffff"

# JPEG encoding quality (1 = worst, 100 = best). Other formats are lossless.
quality = 95

# Filter applied to every input before layout:
# "none", "grayscale", "sepia", "blur", "sharpen" or "edge".
filter = "none"

# Unsharp-mask parameters for the "sharpen" filter.
sharpen_sigma = 0.5
sharpen_threshold = 0

# Text drawn in white onto the bottom-right corner of every input. The font
# size is 5% of the image width, kept between 12 and 100 pixels.
# watermark = "Copyright 2025"

# Image stamped onto the bottom-right corner, scaled down to fit if needed.
# watermark_image = "logo.png"

# Watermark alpha: 0.0 is invisible, 1.0 opaque.
watermark_opacity = 0.5

# Leave undecodable inputs out (with a warning) instead of failing.
skip_invalid = true

# ---------------------------------------------------------------------------
# Text merging
# ---------------------------------------------------------------------------
[text]
# Header before each file: "simple", "fancy", "minimal" or "none".
separator = "simple"

# Prefix every line with its number.
line_numbers = false

# Add file name, size, modification and processing time before each file.
metadata = false

# Trim leading and trailing whitespace from each file.
strip_whitespace = false

# Write a markdown document with one fenced section per file.
markdown = false

# ---------------------------------------------------------------------------
# JSON merging
# ---------------------------------------------------------------------------
[json]
# "array": a list of {"source": name, "data": value} entries.
# "object": one object keyed by file stem.
mode = "array"

# ---------------------------------------------------------------------------
# CSV merging
# ---------------------------------------------------------------------------
[csv]
# The header comes from the first file; later headers are dropped.
# Append a source_file column naming the file each row came from.
source_column = true

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Directory that output names without a directory part are written into.
directory = "output"

# Append _YYYYMMDD_HHMMSS to output names.
timestamp = true

# Keep a _bak_YYYYMMDD_HHMMSS copy of an output before overwriting it.
backup = true
"##
}
