//! Composite geometry: canvas size, grid shape and per-image placement.
//!
//! Everything here works on dimensions only, so a plan can be computed (and
//! printed) without decoding a single pixel. [`compose`](super::compose)
//! consumes the plan to build the actual canvas.
//!
//! Every layout is a grid under the hood:
//!
//! | Layout | rows | cols |
//! |---|---|---|
//! | `Vertical` | N | 1 |
//! | `Horizontal` | 1 | N |
//! | `Grid` | explicit or [`auto_grid_dimensions`] | explicit or auto |
//!
//! Image `i` lands at `((i % cols) * cell_w, (i / cols) * cell_h)`.

use super::calculations::{auto_grid_dimensions, largest_dimensions};
use super::params::Layout;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
}

/// Top-left corner of one image on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    /// Position of the image in the input sequence.
    pub index: usize,
    pub x: u32,
    pub y: u32,
}

/// Resolved geometry of a composite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutPlan {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub rows: u32,
    pub cols: u32,
    /// One entry per input image, in input order.
    pub placements: Vec<Placement>,
}

impl LayoutPlan {
    /// Cells left empty at the end of the last grid row.
    pub fn empty_cells(&self) -> u32 {
        (self.rows * self.cols).saturating_sub(self.placements.len() as u32)
    }
}

/// Resolve the `(rows, cols)` of a grid holding `count` images.
///
/// - neither given → [`auto_grid_dimensions`]
/// - only `cols` → `rows = ceil(count / cols)`
/// - only `rows` → `cols = ceil(count / rows)`
/// - both → used as given, but must hold every image
pub fn resolve_grid(
    count: u32,
    rows: Option<u32>,
    cols: Option<u32>,
) -> Result<(u32, u32), LayoutError> {
    if count == 0 {
        return Err(LayoutError::InvalidLayout(
            "cannot lay out zero images".into(),
        ));
    }
    if rows == Some(0) || cols == Some(0) {
        return Err(LayoutError::InvalidLayout(
            "grid rows and columns must be at least 1".into(),
        ));
    }

    match (rows, cols) {
        (None, None) => Ok(auto_grid_dimensions(count)),
        (None, Some(c)) => Ok((count.div_ceil(c), c)),
        (Some(r), None) => Ok((r, count.div_ceil(r))),
        (Some(r), Some(c)) => {
            if (r as u64) * (c as u64) < count as u64 {
                Err(LayoutError::InvalidLayout(format!(
                    "a {r}x{c} grid has {} cells but {count} images were given",
                    r as u64 * c as u64
                )))
            } else {
                Ok((r, c))
            }
        }
    }
}

/// Pick the cell size: the explicit one if given, otherwise the per-axis
/// maximum of the inputs.
///
/// Fails with [`LayoutError::InvalidDimension`] if either side is zero.
pub fn resolve_cell_size(
    explicit: Option<(u32, u32)>,
    dims: &[(u32, u32)],
) -> Result<(u32, u32), LayoutError> {
    let cell = match explicit {
        Some(cell) => cell,
        None => largest_dimensions(dims).ok_or_else(|| {
            LayoutError::InvalidLayout("cannot derive a cell size from zero images".into())
        })?,
    };

    if cell.0 == 0 || cell.1 == 0 {
        return Err(LayoutError::InvalidDimension(format!(
            "cell size must be positive, got {}x{}",
            cell.0, cell.1
        )));
    }
    Ok(cell)
}

/// Compute the full plan for `count` images of cell size `cell`.
pub fn plan_layout(
    count: usize,
    layout: &Layout,
    cell: (u32, u32),
) -> Result<LayoutPlan, LayoutError> {
    let count = u32::try_from(count)
        .map_err(|_| LayoutError::InvalidLayout(format!("too many images: {count}")))?;
    if count == 0 {
        return Err(LayoutError::InvalidLayout(
            "cannot lay out zero images".into(),
        ));
    }

    let (cell_width, cell_height) = cell;
    if cell_width == 0 || cell_height == 0 {
        return Err(LayoutError::InvalidDimension(format!(
            "cell size must be positive, got {cell_width}x{cell_height}"
        )));
    }

    let (rows, cols) = match *layout {
        Layout::Vertical => (count, 1),
        Layout::Horizontal => (1, count),
        Layout::Grid { rows, cols } => resolve_grid(count, rows, cols)?,
    };

    let canvas_width = cell_width.checked_mul(cols).ok_or_else(|| {
        LayoutError::InvalidDimension(format!(
            "canvas width overflows: {cols} columns of {cell_width}px"
        ))
    })?;
    let canvas_height = cell_height.checked_mul(rows).ok_or_else(|| {
        LayoutError::InvalidDimension(format!(
            "canvas height overflows: {rows} rows of {cell_height}px"
        ))
    })?;

    let placements = (0..count)
        .map(|i| Placement {
            index: i as usize,
            x: (i % cols) * cell_width,
            y: (i / cols) * cell_height,
        })
        .collect();

    Ok(LayoutPlan {
        canvas_width,
        canvas_height,
        cell_width,
        cell_height,
        rows,
        cols,
        placements,
    })
}
