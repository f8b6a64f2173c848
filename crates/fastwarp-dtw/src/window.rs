//! Search windows restricting which cost-grid cells a DTW pass may visit.

use std::ops::Range;

use crate::error::DtwError;

/// A set of grid cells, stored as one contiguous column range per row.
///
/// Every row holds at least one cell, and the window always contains a warp
/// path from `(0, 0)` to `(n_rows - 1, n_cols - 1)`. Cells are addressed in a
/// flat row-major layout: row `i` occupies `offset(i)..offset(i + 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchWindow {
    n_cols: usize,
    rows: Vec<Range<usize>>,
    offsets: Vec<usize>,
}

impl SearchWindow {
    /// Create a window covering the full `n_rows x n_cols` grid.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[must_use]
    pub fn full(n_rows: usize, n_cols: usize) -> Self {
        assert!(n_rows > 0 && n_cols > 0, "window dimensions must be non-zero");
        Self::from_rows_unchecked(n_cols, vec![0..n_cols; n_rows])
    }

    /// Create a window from explicit per-row column ranges.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidWindow`] | No rows, an empty or out-of-bounds row, or no connected path from `(0, 0)` to `(n_rows - 1, n_cols - 1)` |
    pub fn from_rows(n_cols: usize, rows: Vec<Range<usize>>) -> Result<Self, DtwError> {
        if rows.is_empty() || n_cols == 0 {
            return Err(DtwError::InvalidWindow {
                reason: "window has no cells".into(),
            });
        }
        for (i, r) in rows.iter().enumerate() {
            if r.start >= r.end || r.end > n_cols {
                return Err(DtwError::InvalidWindow {
                    reason: format!("row {i} has invalid column range {r:?} for {n_cols} columns"),
                });
            }
        }
        let window = Self::from_rows_unchecked(n_cols, rows);
        window.check_connected()?;
        Ok(window)
    }

    pub(crate) fn from_rows_unchecked(n_cols: usize, rows: Vec<Range<usize>>) -> Self {
        let mut offsets = Vec::with_capacity(rows.len() + 1);
        let mut total = 0;
        offsets.push(0);
        for r in &rows {
            total += r.len();
            offsets.push(total);
        }
        Self {
            n_cols,
            rows,
            offsets,
        }
    }

    /// Verify that a monotone, continuous path joins the two grid corners.
    ///
    /// Reachable cells of each row form a suffix of that row's range, so one
    /// pass over the rows tracking the first reachable column is enough.
    pub(crate) fn check_connected(&self) -> Result<(), DtwError> {
        let first = &self.rows[0];
        if first.start != 0 {
            return Err(DtwError::InvalidWindow {
                reason: "window does not contain (0, 0)".into(),
            });
        }
        let mut reach = first.clone();
        for (i, row) in self.rows.iter().enumerate().skip(1) {
            // Entry from the row above is vertical (same column) or diagonal (column + 1).
            let entry = reach.start.max(row.start);
            if entry >= (reach.end + 1).min(row.end) {
                return Err(DtwError::InvalidWindow {
                    reason: format!("row {i} is unreachable from row {}", i - 1),
                });
            }
            reach = entry..row.end;
        }
        if reach.end != self.n_cols {
            return Err(DtwError::InvalidWindow {
                reason: format!(
                    "window does not contain ({}, {})",
                    self.rows.len() - 1,
                    self.n_cols - 1
                ),
            });
        }
        Ok(())
    }

    /// Return the number of rows (length of the first series).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Return the number of columns (length of the second series).
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Return the total number of cells in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets[self.rows.len()]
    }

    /// Return true if the window holds no cells. Never true for a constructed window.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the admitted column range of row `i`.
    #[must_use]
    pub fn column_range(&self, i: usize) -> Range<usize> {
        self.rows[i].clone()
    }

    /// Return true if cell `(i, j)` lies inside the window.
    #[must_use]
    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.rows.get(i).is_some_and(|r| r.contains(&j))
    }

    /// Return the widest row of the window.
    #[must_use]
    pub fn max_row_width(&self) -> usize {
        self.rows.iter().map(Range::len).max().unwrap_or(0)
    }

    /// Return true if the window spans the whole grid.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() == self.rows.len() * self.n_cols
    }

    /// Flat storage index of cell `(i, j)`, or `None` outside the window.
    #[inline]
    pub(crate) fn flat_index(&self, i: usize, j: usize) -> Option<usize> {
        let r = self.rows.get(i)?;
        if r.contains(&j) {
            Some(self.offsets[i] + (j - r.start))
        } else {
            None
        }
    }

    /// Iterate over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(i, r)| r.clone().map(move |j| (i, j)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_window_covers_grid() {
        let w = SearchWindow::full(3, 4);
        assert_eq!(w.len(), 12);
        assert!(w.is_full());
        assert_eq!(w.column_range(2), 0..4);
        assert_eq!(w.flat_index(2, 3), Some(11));
        assert!(w.check_connected().is_ok());
    }

    #[test]
    fn flat_index_follows_row_offsets() {
        let w = SearchWindow::from_rows(4, vec![0..2, 1..3, 2..4]).unwrap();
        assert_eq!(w.len(), 6);
        assert_eq!(w.flat_index(0, 0), Some(0));
        assert_eq!(w.flat_index(1, 1), Some(2));
        assert_eq!(w.flat_index(2, 3), Some(5));
        assert_eq!(w.flat_index(1, 0), None);
        assert_eq!(w.flat_index(3, 0), None);
    }

    #[test]
    fn diagonal_only_window_is_connected() {
        let w = SearchWindow::from_rows(3, vec![0..1, 1..2, 2..3]).unwrap();
        assert_eq!(w.len(), 3);
        assert!(!w.is_full());
    }

    #[test]
    fn rejects_window_missing_origin() {
        let result = SearchWindow::from_rows(3, vec![1..2, 1..3, 2..3]);
        assert!(matches!(result, Err(DtwError::InvalidWindow { .. })));
    }

    #[test]
    fn rejects_window_missing_end() {
        let result = SearchWindow::from_rows(3, vec![0..2, 1..2, 1..2]);
        assert!(matches!(result, Err(DtwError::InvalidWindow { .. })));
    }

    #[test]
    fn rejects_gap_between_rows() {
        let result = SearchWindow::from_rows(5, vec![0..1, 2..5]);
        assert!(matches!(result, Err(DtwError::InvalidWindow { .. })));
    }

    #[test]
    fn rejects_row_that_moves_backwards_past_reach() {
        // Row 1 only admits column 0, but row 0's reachable cells end at column 2
        // and row 2 needs column 3: the path would have to go back.
        let result = SearchWindow::from_rows(4, vec![0..3, 0..1, 3..4]);
        assert!(matches!(result, Err(DtwError::InvalidWindow { .. })));
    }

    #[test]
    fn rejects_out_of_bounds_row() {
        let result = SearchWindow::from_rows(3, vec![0..4]);
        assert!(matches!(result, Err(DtwError::InvalidWindow { .. })));
    }

    #[test]
    fn cells_iterate_row_major() {
        let w = SearchWindow::from_rows(3, vec![0..2, 1..3]).unwrap();
        let cells: Vec<_> = w.cells().collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (1, 1), (1, 2)]);
        assert!(w.contains(1, 2));
        assert!(!w.contains(1, 0));
        assert_eq!(w.max_row_width(), 2);
    }
}
