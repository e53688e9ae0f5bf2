//! # filemerge
//!
//! Merge images into stacked or tiled composites, and concatenate text,
//! JSON or CSV files into a single document.
//!
//! # Architecture
//!
//! ```text
//! inputs  →  files::collect_sources  →  detect_kind
//!                                         ├─ images → imaging::merge_images  → composite file
//!                                         ├─ text   → text::merge_text       → merged document
//!                                         ├─ json   → text::merge_json       → merged document
//!                                         └─ csv    → text::merge_csv        → merged table
//! ```
//!
//! The image path is split so the geometry can be tested without pixels:
//! [`imaging::plan_layout`] computes canvas size and placements from
//! dimensions alone, and [`imaging::compose`] fills a canvas from that plan.
//! Decoding and encoding sit behind the [`imaging::ImageBackend`] trait, so
//! merge operations run against a recording mock in unit tests.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Layout engine, per-image transforms, backend trait and the `image` crate implementation |
//! | [`text`] | Text concatenation (separators, numbering, metadata, markdown), JSON and CSV merging |
//! | [`files`] | Input discovery and categorization, timestamped output names, backups |
//! | [`config`] | `filemerge.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## Explicit Layout Values
//!
//! A merge is described entirely by a [`imaging::LayoutOptions`] value built
//! by the caller from flags or config. There is no interactive selection, so
//! the same options always produce the same canvas.
//!
//! ## Uniform Cells
//!
//! Every image occupies one cell of the same size. Without an explicit cell
//! size the per-axis maximum of the inputs is used, so nothing is upscaled
//! past the largest input and mixed sizes still line up.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling (Lanczos3) and encoding all go through the `image`
//! crate. No ImageMagick, no system libraries. Watermark text uses the
//! built-in `font8x8` bitmap font, so no font files are looked up either.

pub mod config;
pub mod files;
pub mod imaging;
pub mod output;
pub mod text;

#[cfg(test)]
pub(crate) mod test_helpers;
