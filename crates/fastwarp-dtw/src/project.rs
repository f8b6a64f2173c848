//! Projection of a coarse warp path onto the next finer resolution.

use tracing::trace;

use crate::coarsen::ReductionRecord;
use crate::error::DtwError;
use crate::path::WarpPath;
use crate::window::SearchWindow;

/// Expand a coarse-resolution warp path into a search window at the finer resolution.
///
/// Every coarse cell `(I, J)` on `path` covers the fine block
/// `x_record.span(I) x y_record.span(J)`; the block is grown by `radius` cells
/// in every direction (Chebyshev distance) and clipped to the fine grid. Each
/// fine row admits the column hull of the blocks touching it.
///
/// The hull is then patched so the window stays connected: a row with no
/// cells inherits the row above, each row's right edge is carried down to the
/// rows below it, and each row reaches back at least to the right edge of the
/// row above. `(0, 0)` and `(n-1, m-1)` are always admitted.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DtwError::InvalidWindow`] | `path` is not a valid warp path over the coarse grid described by the records |
pub fn project(
    path: &WarpPath,
    x_record: &ReductionRecord,
    y_record: &ReductionRecord,
    radius: usize,
) -> Result<SearchWindow, DtwError> {
    if !path.is_valid_for(x_record.coarse_len(), y_record.coarse_len()) {
        return Err(DtwError::InvalidWindow {
            reason: format!(
                "coarse path does not span the {}x{} coarse grid",
                x_record.coarse_len(),
                y_record.coarse_len()
            ),
        });
    }

    let n = x_record.fine_len();
    let m = y_record.fine_len();
    let mut lo = vec![usize::MAX; n];
    let mut hi = vec![0usize; n];

    for step in path {
        let rows = x_record.span(step.x);
        let cols = y_record.span(step.y);
        let row_start = rows.start.saturating_sub(radius);
        let row_end = rows.end.saturating_add(radius).min(n);
        let col_start = cols.start.saturating_sub(radius);
        let col_end = cols.end.saturating_add(radius).min(m);
        for i in row_start..row_end {
            lo[i] = lo[i].min(col_start);
            hi[i] = hi[i].max(col_end);
        }
    }

    lo[0] = 0;
    for i in 1..n {
        if lo[i] == usize::MAX {
            lo[i] = lo[i - 1];
            hi[i] = hi[i - 1];
        }
        hi[i] = hi[i].max(hi[i - 1]);
        lo[i] = lo[i].min(hi[i - 1]);
    }
    if hi[0] == 0 {
        hi[0] = 1;
    }
    hi[n - 1] = m;

    let rows = lo.into_iter().zip(hi).map(|(a, b)| a..b).collect();
    let window = SearchWindow::from_rows(m, rows)?;
    trace!(n, m, radius, cells = window.len(), "projected search window");
    Ok(window)
}
