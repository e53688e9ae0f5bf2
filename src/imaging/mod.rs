//! Image merging: decode, transform, lay out, encode.
//!
//! | Stage | Module | Crate / function |
//! |---|---|---|
//! | **Identify / decode** | [`rust_backend`] | `image::image_dimensions`, `ImageReader` |
//! | **Filters / watermark** | [`transform`] | `DynamicImage::{grayscale, blur}`, `imageops::{unsharpen, overlay}`, `font8x8` |
//! | **Layout geometry** | [`layout`] | pure integer math |
//! | **Normalize + place** | [`compose`] | `imageops::{resize, crop_imm, replace}` (Lanczos3) |
//! | **Encode** | [`rust_backend`] | `JpegEncoder`, `WebPEncoder`, `DynamicImage::write_to` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing a merge (layout, resize mode, background)
//! - **Layout / Compose**: The layout engine, from geometry plan to pixel canvas
//! - **Transform**: Per-image filters and watermarking
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining the engine with a backend

pub mod backend;
mod calculations;
pub mod compose;
pub mod layout;
pub mod operations;
mod params;
pub mod rust_backend;
pub mod transform;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    auto_grid_dimensions, calculate_fill_dimensions, calculate_fit_dimensions,
};
pub use compose::{Composite, compose, normalize};
pub use layout::{LayoutError, LayoutPlan, Placement, plan_layout, resolve_grid};
pub use operations::{
    MergeError, MergePlan, MergeReport, MergeRequest, merge_images, plan_merge,
};
pub use params::{
    Background, Layout, LayoutKind, LayoutOptions, Quality, ResizeMode, Sharpening,
};
pub use rust_backend::{RustBackend, supported_input_extensions};
pub use transform::{
    Filter, ImageWatermark, Pipeline, TextWatermark, apply_filter, watermark_font_size,
};
