//! High-level image merge operations.
//!
//! These functions combine the backend (decode, encode) with the pure layout
//! engine. [`plan_merge`] only reads headers; [`merge_images`] runs the full
//! load → transform → compose → save sequence.

use super::backend::{BackendError, ImageBackend};
use super::compose::{Composite, compose};
use super::layout::{LayoutError, LayoutPlan, plan_layout, resolve_cell_size};
use super::params::{LayoutOptions, Quality};
use super::transform::Pipeline;
use crate::files::{FilesError, SkippedSource, backup_existing};
use image::DynamicImage;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("{}: {source}", path.display())]
    Source { path: PathBuf, source: BackendError },
    #[error("Failed to save {}: {source}", path.display())]
    Save { path: PathBuf, source: BackendError },
    #[error(transparent)]
    Files(#[from] FilesError),
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, MergeError>;

/// Everything needed to merge a set of images into one file.
#[derive(Debug, Clone)]
pub struct MergeRequest {
    /// Inputs, in placement order.
    pub sources: Vec<PathBuf>,
    pub output: PathBuf,
    pub options: LayoutOptions,
    /// Per-image transforms, applied before layout.
    pub pipeline: Pipeline,
    pub quality: Quality,
    /// Skip undecodable sources instead of failing.
    pub skip_invalid: bool,
    /// Back up an existing output, stamped with this time.
    pub backup: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct MergeReport {
    pub output: PathBuf,
    /// Sources that made it into the composite, in placement order.
    pub merged: Vec<PathBuf>,
    pub skipped: Vec<SkippedSource>,
    pub backup: Option<PathBuf>,
    pub plan: LayoutPlan,
}

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    backend
        .identify(path)
        .map(Into::into)
        .map_err(|source| MergeError::Source {
            path: path.to_path_buf(),
            source,
        })
}

/// Layout preview of a merge, computed from image headers alone.
#[derive(Debug, Clone)]
pub struct MergePlan {
    pub plan: LayoutPlan,
    /// Sources the plan places, in placement order.
    pub sources: Vec<PathBuf>,
    pub skipped: Vec<SkippedSource>,
}

/// Compute the layout of a merge from image headers alone.
///
/// Unreadable headers are skipped when `skip_invalid` is set, matching what
/// [`merge_images`] would do with the same inputs.
pub fn plan_merge(
    backend: &impl ImageBackend,
    sources: &[PathBuf],
    options: &LayoutOptions,
    skip_invalid: bool,
) -> Result<MergePlan> {
    let mut dims = Vec::with_capacity(sources.len());
    let mut planned = Vec::with_capacity(sources.len());
    let mut skipped = Vec::new();

    for path in sources {
        match get_dimensions(backend, path) {
            Ok(d) => {
                dims.push(d);
                planned.push(path.clone());
            }
            Err(MergeError::Source { path, source }) if skip_invalid => {
                warn!("Skipping {}: {source}", path.display());
                skipped.push(SkippedSource {
                    path,
                    reason: source.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    if dims.is_empty() {
        return Err(LayoutError::InvalidLayout(format!(
            "no images to merge ({} skipped)",
            skipped.len()
        ))
        .into());
    }
    let cell = resolve_cell_size(options.cell_size, &dims)?;
    let plan = plan_layout(dims.len(), &options.layout, cell)?;
    Ok(MergePlan {
        plan,
        sources: planned,
        skipped,
    })
}

/// Merge `request.sources` into a single image at `request.output`.
pub fn merge_images(backend: &impl ImageBackend, request: &MergeRequest) -> Result<MergeReport> {
    let mut images: Vec<DynamicImage> = Vec::with_capacity(request.sources.len());
    let mut merged = Vec::new();
    let mut skipped = Vec::new();

    for path in &request.sources {
        match backend.load(path) {
            Ok(image) => {
                debug!("Loaded {} ({}x{})", path.display(), image.width(), image.height());
                images.push(request.pipeline.apply(image));
                merged.push(path.clone());
            }
            Err(e) if request.skip_invalid => {
                warn!("Skipping {}: {e}", path.display());
                skipped.push(SkippedSource {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
            Err(source) => {
                return Err(MergeError::Source {
                    path: path.clone(),
                    source,
                });
            }
        }
    }

    if images.is_empty() {
        return Err(LayoutError::InvalidLayout(format!(
            "no loadable images ({} skipped)",
            skipped.len()
        ))
        .into());
    }

    let Composite { image, plan } = compose(&images, &request.options)?;
    drop(images);

    let backup = match request.backup {
        Some(ts) => backup_existing(&request.output, ts)?,
        None => None,
    };
    backend
        .save(
            &DynamicImage::ImageRgba8(image),
            &request.output,
            request.quality,
        )
        .map_err(|source| MergeError::Save {
            path: request.output.clone(),
            source,
        })?;

    info!(
        "Merged {} images into {} ({}x{})",
        merged.len(),
        request.output.display(),
        plan.canvas_width,
        plan.canvas_height
    );

    Ok(MergeReport {
        output: request.output.clone(),
        merged,
        skipped,
        backup,
        plan,
    })
}
