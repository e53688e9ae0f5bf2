//! The layout engine: normalize every image to the cell size, then paint the
//! cells onto one canvas.
//!
//! | Resize mode | Scale | Then |
//! |---|---|---|
//! | `Fit` | [`calculate_fit_dimensions`] | center on a background-filled cell |
//! | `Fill` | [`calculate_fill_dimensions`] | center-crop to the cell |
//! | `Stretch` | exact cell size | nothing |
//!
//! Resampling uses Lanczos3. An image that already matches the cell is copied
//! without resampling, so a single-image merge reproduces its input exactly.
//! Source pixels are copied, never blended over the background, so alpha is
//! preserved the same way in every mode.

use super::calculations::{calculate_fill_dimensions, calculate_fit_dimensions, center_offset};
use super::layout::{LayoutError, LayoutPlan, plan_layout, resolve_cell_size};
use super::params::{Background, LayoutOptions, ResizeMode};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbaImage};

/// A finished composite and the geometry that produced it.
#[derive(Debug, Clone)]
pub struct Composite {
    pub image: RgbaImage,
    pub plan: LayoutPlan,
}

/// Resize one image to exactly `cell` according to `mode`.
///
/// Zero-sized sources cannot be scaled and are rejected with
/// [`LayoutError::InvalidDimension`].
pub fn normalize(
    image: &DynamicImage,
    cell: (u32, u32),
    mode: ResizeMode,
    background: Background,
) -> Result<RgbaImage, LayoutError> {
    let (cell_w, cell_h) = cell;
    if cell_w == 0 || cell_h == 0 {
        return Err(LayoutError::InvalidDimension(format!(
            "cell size must be positive, got {cell_w}x{cell_h}"
        )));
    }
    let source = image.dimensions();
    if source.0 == 0 || source.1 == 0 {
        return Err(LayoutError::InvalidDimension(format!(
            "source image has no pixels ({}x{})",
            source.0, source.1
        )));
    }

    let rgba = image.to_rgba8();
    if source == cell {
        return Ok(rgba);
    }

    let normalized = match mode {
        ResizeMode::Stretch => imageops::resize(&rgba, cell_w, cell_h, FilterType::Lanczos3),
        ResizeMode::Fit => {
            let (w, h) = calculate_fit_dimensions(source, cell);
            let scaled = scale(&rgba, w, h);
            let mut padded = RgbaImage::from_pixel(cell_w, cell_h, background.to_rgba());
            imageops::replace(
                &mut padded,
                &scaled,
                center_offset(cell_w, w) as i64,
                center_offset(cell_h, h) as i64,
            );
            padded
        }
        ResizeMode::Fill => {
            let (w, h) = calculate_fill_dimensions(source, cell);
            let scaled = scale(&rgba, w, h);
            imageops::crop_imm(
                &scaled,
                center_offset(w, cell_w),
                center_offset(h, cell_h),
                cell_w,
                cell_h,
            )
            .to_image()
        }
    };
    Ok(normalized)
}

/// Lanczos3 resize that skips the work when the size is unchanged.
fn scale(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        image.clone()
    } else {
        imageops::resize(image, width, height, FilterType::Lanczos3)
    }
}

/// Build the composite canvas for `images` in order.
///
/// The cell size is `options.cell_size` or, when absent, the per-axis maximum
/// of the inputs. Grid cells without an image keep the background color.
/// Inputs are borrowed and never modified.
pub fn compose(images: &[DynamicImage], options: &LayoutOptions) -> Result<Composite, LayoutError> {
    if images.is_empty() {
        return Err(LayoutError::InvalidLayout(
            "cannot lay out zero images".into(),
        ));
    }

    let dims: Vec<(u32, u32)> = images.iter().map(|img| img.dimensions()).collect();
    let cell = resolve_cell_size(options.cell_size, &dims)?;
    let plan = plan_layout(images.len(), &options.layout, cell)?;
    log::debug!(
        "composing {} images into {}x{} ({} rows x {} cols of {}x{})",
        images.len(),
        plan.canvas_width,
        plan.canvas_height,
        plan.rows,
        plan.cols,
        plan.cell_width,
        plan.cell_height
    );

    let mut canvas = RgbaImage::from_pixel(
        plan.canvas_width,
        plan.canvas_height,
        options.background.to_rgba(),
    );
    for placement in &plan.placements {
        let cell_image = normalize(
            &images[placement.index],
            cell,
            options.resize,
            options.background,
        )?;
        // Cells already carry their padding, so copy instead of blending.
        imageops::replace(
            &mut canvas,
            &cell_image,
            placement.x as i64,
            placement.y as i64,
        );
    }

    Ok(Composite {
        image: canvas,
        plan,
    })
}
