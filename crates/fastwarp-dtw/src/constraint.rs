//! Band constraints for exact DTW computation.

use std::ops::Range;

use crate::window::SearchWindow;

/// Global constraint on the exact DTW warping window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BandConstraint {
    /// No constraint: the full cost grid is computed.
    #[default]
    Unconstrained,

    /// Sakoe-Chiba band: cell `(i, j)` is admitted only if `|i - j| <= radius`.
    ///
    /// The radius is widened to at least `|n - m|` so that the final cell
    /// `(n-1, m-1)` is always reachable for series of unequal length.
    SakoeChibaRadius(usize),
}

impl BandConstraint {
    /// Return the radius actually applied to an `n x m` grid, or `None` when unconstrained.
    #[must_use]
    pub fn effective_radius(&self, n: usize, m: usize) -> Option<usize> {
        match self {
            Self::Unconstrained => None,
            Self::SakoeChibaRadius(r) => Some((*r).max(n.abs_diff(m))),
        }
    }

    /// Return the admitted column range for row `row` of an `n_rows x n_cols` grid.
    #[must_use]
    pub fn column_range(&self, row: usize, n_rows: usize, n_cols: usize) -> Range<usize> {
        match self.effective_radius(n_rows, n_cols) {
            None => 0..n_cols,
            Some(r) => {
                let start = row.saturating_sub(r).min(n_cols - 1);
                let end = row.saturating_add(r).saturating_add(1).min(n_cols);
                start..end
            }
        }
    }

    /// Build the [`SearchWindow`] this constraint admits on an `n_rows x n_cols` grid.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[must_use]
    pub fn window(&self, n_rows: usize, n_cols: usize) -> SearchWindow {
        assert!(n_rows > 0 && n_cols > 0, "window dimensions must be non-zero");
        let rows = (0..n_rows)
            .map(|i| self.column_range(i, n_rows, n_cols))
            .collect();
        SearchWindow::from_rows_unchecked(n_cols, rows)
    }
}
