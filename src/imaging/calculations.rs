//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate dimensions that fit entirely inside a target area.
///
/// Scales by the smaller of the two axis ratios so the whole source stays
/// visible. One dimension matches the target, the other is at most the target.
/// Both results are clamped to `1..=target` so rounding never overflows the
/// cell or collapses an extreme aspect ratio to zero.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target area dimensions (width, height)
///
/// # Examples
/// ```
/// # use filemerge::imaging::calculate_fit_dimensions;
/// // 800x600 into a 400x400 box → 400x300
/// assert_eq!(calculate_fit_dimensions((800, 600), (400, 400)), (400, 300));
///
/// // 100x50 into 400x400 is scaled up → 400x200
/// assert_eq!(calculate_fit_dimensions((100, 50), (400, 400)), (400, 200));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let scale = (tgt_w as f64 / src_w as f64).min(tgt_h as f64 / src_h as f64);
    let w = (src_w as f64 * scale).round() as u32;
    let h = (src_h as f64 * scale).round() as u32;
    (w.clamp(1, tgt_w), h.clamp(1, tgt_h))
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target area dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Fill dimensions (at least one matches target)
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = (h as f64 * src_aspect).round() as u32;
        (w.max(tgt_w), h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = (w as f64 / src_aspect).round() as u32;
        (w, h.max(tgt_h))
    }
}

/// Offset that centers a span of `inner` pixels inside `outer`.
///
/// Odd leftovers go to the far side (integer division), matching how both
/// fit padding and fill cropping are centered.
pub fn center_offset(outer: u32, inner: u32) -> u32 {
    outer.saturating_sub(inner) / 2
}

/// Near-square grid for `count` cells: `(rows, cols)`.
///
/// `cols = ceil(sqrt(count))`, `rows = ceil(count / cols)`. Ties favor more
/// columns than rows, so 5 images give 2 rows of 3. A count of zero yields
/// `(0, 0)`; callers reject empty input before asking for a grid.
pub fn auto_grid_dimensions(count: u32) -> (u32, u32) {
    if count == 0 {
        return (0, 0);
    }
    let cols = ceil_sqrt(count);
    (count.div_ceil(cols), cols)
}

/// Smallest `c` with `c * c >= n`. Integer-only to avoid float error near
/// perfect squares.
fn ceil_sqrt(n: u32) -> u32 {
    let mut c = (n as f64).sqrt() as u32;
    while (c as u64) * (c as u64) < n as u64 {
        c += 1;
    }
    while c > 1 && ((c - 1) as u64) * ((c - 1) as u64) >= n as u64 {
        c -= 1;
    }
    c.max(1)
}

/// Per-axis maximum over a set of dimensions.
///
/// This is the derived cell size when none is given explicitly: every input
/// fits its cell without downscaling under `Fit`. Returns `None` for empty input.
pub fn largest_dimensions(dims: &[(u32, u32)]) -> Option<(u32, u32)> {
    dims.iter()
        .copied()
        .reduce(|(aw, ah), (bw, bh)| (aw.max(bw), ah.max(bh)))
}
