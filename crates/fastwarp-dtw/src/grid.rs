//! Cumulative cost grids over a [`SearchWindow`], and warp path traceback.

use crate::error::DtwError;
use crate::metric::PointMetric;
use crate::path::{WarpPath, WarpStep};
use crate::series::SeriesView;
use crate::window::SearchWindow;

/// Predecessor chosen for a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// `(0, 0)`, or a cell no admitted predecessor reaches.
    Origin,
    /// From `(i-1, j-1)`.
    Diagonal,
    /// From `(i-1, j)`.
    Vertical,
    /// From `(i, j-1)`.
    Horizontal,
}

/// Pick the cheapest predecessor. Ties prefer diagonal, then vertical, then horizontal.
#[inline]
fn best_predecessor(diag: f64, vert: f64, horiz: f64) -> (f64, Step) {
    if diag <= vert && diag <= horiz {
        (diag, Step::Diagonal)
    } else if vert <= horiz {
        (vert, Step::Vertical)
    } else {
        (horiz, Step::Horizontal)
    }
}

/// Cumulative cost and backpointers for every cell of a window.
///
/// Cells outside the window are never materialized and read as `+inf`.
#[derive(Debug)]
pub(crate) struct CostGrid<'w> {
    window: &'w SearchWindow,
    cost: Vec<f64>,
    steps: Vec<Step>,
}

impl<'w> CostGrid<'w> {
    /// Fill the grid with the DTW recurrence restricted to `window`.
    ///
    /// Callers guarantee `window` is `x.len() x y.len()` and that both series
    /// share dimensionality.
    pub(crate) fn compute<M>(
        x: SeriesView<'_>,
        y: SeriesView<'_>,
        window: &'w SearchWindow,
        metric: &M,
    ) -> Self
    where
        M: PointMetric + ?Sized,
    {
        debug_assert_eq!(window.n_rows(), x.len());
        debug_assert_eq!(window.n_cols(), y.len());

        let mut cost = vec![f64::INFINITY; window.len()];
        let mut steps = vec![Step::Origin; window.len()];

        for i in 0..x.len() {
            let cols = window.column_range(i);
            let xi = x.point(i);
            let Some(row_base) = window.flat_index(i, cols.start) else {
                continue;
            };

            for j in cols.clone() {
                let idx = row_base + (j - cols.start);
                let d = metric.distance(xi, y.point(j));

                if i == 0 && j == 0 {
                    cost[idx] = d;
                    continue;
                }

                let diag = if i > 0 && j > 0 {
                    window.flat_index(i - 1, j - 1).map_or(f64::INFINITY, |k| cost[k])
                } else {
                    f64::INFINITY
                };
                let vert = if i > 0 {
                    window.flat_index(i - 1, j).map_or(f64::INFINITY, |k| cost[k])
                } else {
                    f64::INFINITY
                };
                let horiz = if j > cols.start {
                    cost[idx - 1]
                } else {
                    f64::INFINITY
                };

                let (best, step) = best_predecessor(diag, vert, horiz);
                if best.is_finite() {
                    cost[idx] = d + best;
                    steps[idx] = step;
                }
            }
        }

        Self {
            window,
            cost,
            steps,
        }
    }

    /// Return the cumulative cost at `(n-1, m-1)`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidWindow`] | The final cell is outside the window or unreachable |
    pub(crate) fn total_cost(&self) -> Result<f64, DtwError> {
        let (n, m) = (self.window.n_rows(), self.window.n_cols());
        let total = self
            .window
            .flat_index(n - 1, m - 1)
            .map_or(f64::INFINITY, |k| self.cost[k]);
        if total.is_infinite() {
            return Err(DtwError::InvalidWindow {
                reason: format!("cell ({}, {}) is unreachable", n - 1, m - 1),
            });
        }
        Ok(total)
    }

    /// Walk backpointers from `(n-1, m-1)` to `(0, 0)`, returning the path in forward order.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidWindow`] | A cell on the walk is missing or has no predecessor |
    pub(crate) fn traceback(&self) -> Result<WarpPath, DtwError> {
        let mut i = self.window.n_rows() - 1;
        let mut j = self.window.n_cols() - 1;
        let mut steps = Vec::with_capacity(i + j + 1);

        loop {
            steps.push(WarpStep::new(i, j));
            if i == 0 && j == 0 {
                break;
            }
            let step = self
                .window
                .flat_index(i, j)
                .filter(|&k| self.cost[k].is_finite())
                .map(|k| self.steps[k]);
            match step {
                Some(Step::Diagonal) => {
                    i -= 1;
                    j -= 1;
                }
                Some(Step::Vertical) => i -= 1,
                Some(Step::Horizontal) => j -= 1,
                Some(Step::Origin) | None => {
                    return Err(DtwError::InvalidWindow {
                        reason: format!("missing backpointer at ({i}, {j})"),
                    });
                }
            }
        }

        steps.reverse();
        Ok(WarpPath::new(steps))
    }
}

/// Rolling two-row DTW over `window`, computing only the final cost.
///
/// Each row buffer is as wide as the widest window row; row `i` stores column
/// `j` at `j - window.column_range(i).start`. Reads outside the previous row's
/// range yield `+inf`.
///
/// When `cutoff` is `Some(c)`, returns `f64::INFINITY` as soon as every cell of
/// a non-final row exceeds `c`. Every warp path crosses each row, so the row
/// minimum is a lower bound on the final cost.
pub(crate) fn rolling_cost<M>(
    x: SeriesView<'_>,
    y: SeriesView<'_>,
    window: &SearchWindow,
    metric: &M,
    cutoff: Option<f64>,
) -> f64
where
    M: PointMetric + ?Sized,
{
    let n = x.len();
    let width = window.max_row_width();
    let mut prev = vec![f64::INFINITY; width];
    let mut curr = vec![f64::INFINITY; width];
    let mut prev_cols = 0..0;

    for i in 0..n {
        curr.fill(f64::INFINITY);
        let cols = window.column_range(i);
        let xi = x.point(i);
        let mut row_min = f64::INFINITY;

        for j in cols.clone() {
            let cj = j - cols.start;
            let d = metric.distance(xi, y.point(j));

            if i == 0 && j == 0 {
                curr[cj] = d;
                row_min = row_min.min(d);
                continue;
            }

            let diag = if j > 0 && prev_cols.contains(&(j - 1)) {
                prev[j - 1 - prev_cols.start]
            } else {
                f64::INFINITY
            };
            let vert = if prev_cols.contains(&j) {
                prev[j - prev_cols.start]
            } else {
                f64::INFINITY
            };
            let horiz = if cj > 0 { curr[cj - 1] } else { f64::INFINITY };

            let val = d + diag.min(vert).min(horiz);
            curr[cj] = val;
            row_min = row_min.min(val);
        }

        if let Some(c) = cutoff
            && i < n - 1
            && row_min > c
        {
            return f64::INFINITY;
        }

        prev_cols = cols;
        std::mem::swap(&mut prev, &mut curr);
    }

    // After the final swap `prev` holds the last completed row.
    let last = window.n_cols() - 1;
    let total = if prev_cols.contains(&last) {
        prev[last - prev_cols.start]
    } else {
        f64::INFINITY
    };

    match cutoff {
        Some(c) if total > c => f64::INFINITY,
        _ => total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::Metric;
    use crate::series::Series;

    fn uni(values: &[f64]) -> Series {
        Series::univariate(values.to_vec()).unwrap()
    }

    #[test]
    fn hand_computed_2x2() {
        // x=[0,1], y=[1,0], |a-b|
        // D[0][0] = 1, D[0][1] = 1 + 0 = 1, D[1][0] = 1 + 0 = 1
        // D[1][1] = 1 + min(1, 1, 1) = 2, diagonal preferred
        let x = uni(&[0.0, 1.0]);
        let y = uni(&[1.0, 0.0]);
        let w = SearchWindow::full(2, 2);
        let grid = CostGrid::compute(x.as_view(), y.as_view(), &w, &Metric::Manhattan);
        assert_eq!(grid.total_cost().unwrap(), 2.0);
        let path = grid.traceback().unwrap();
        assert_eq!(path.to_pairs(), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn boundary_rows_accumulate() {
        // Single row: D[0][j] = D[0][j-1] + d
        let x = uni(&[0.0]);
        let y = uni(&[1.0, 2.0, 3.0]);
        let w = SearchWindow::full(1, 3);
        let grid = CostGrid::compute(x.as_view(), y.as_view(), &w, &Metric::Manhattan);
        assert_eq!(grid.total_cost().unwrap(), 6.0);
        assert_eq!(
            grid.traceback().unwrap().to_pairs(),
            vec![(0, 0), (0, 1), (0, 2)]
        );
    }

    #[test]
    fn tie_break_prefers_vertical_over_horizontal() {
        // Only the (1, 1) pairing costs anything, so at (2, 2) the diagonal
        // predecessor is dearer and vertical ties with horizontal.
        let table = |a: &[f64], b: &[f64]| if a[0] == 1.0 && b[0] == 1.0 { 5.0 } else { 0.0 };
        let x = uni(&[0.0, 1.0, 2.0]);
        let y = uni(&[0.0, 1.0, 2.0]);
        let w = SearchWindow::full(3, 3);
        let grid = CostGrid::compute(x.as_view(), y.as_view(), &w, &table);
        assert_eq!(grid.total_cost().unwrap(), 0.0);
        assert_eq!(
            grid.traceback().unwrap().to_pairs(),
            vec![(0, 0), (0, 1), (1, 2), (2, 2)]
        );

        // All-zero grid: every predecessor ties and the diagonal wins.
        let x = uni(&[0.0, 0.0, 0.0]);
        let y = uni(&[0.0, 0.0]);
        let w = SearchWindow::full(3, 2);
        let grid = CostGrid::compute(x.as_view(), y.as_view(), &w, &Metric::Manhattan);
        // (2,1): diag (1,0)=0, vert (1,1)=0 -> diagonal; (1,0): vertical from (0,0).
        assert_eq!(
            grid.traceback().unwrap().to_pairs(),
            vec![(0, 0), (1, 0), (2, 1)]
        );
    }

    #[test]
    fn windowed_grid_skips_excluded_cells() {
        // Diagonal-only window forces the lock-step alignment.
        let x = uni(&[0.0, 5.0, 0.0]);
        let y = uni(&[5.0, 0.0, 5.0]);
        let w = SearchWindow::from_rows(3, vec![0..1, 1..2, 2..3]).unwrap();
        let grid = CostGrid::compute(x.as_view(), y.as_view(), &w, &Metric::Manhattan);
        assert_eq!(grid.total_cost().unwrap(), 15.0);
        assert_eq!(
            grid.traceback().unwrap().to_pairs(),
            vec![(0, 0), (1, 1), (2, 2)]
        );
    }

    #[test]
    fn unreachable_end_is_invalid_window() {
        let x = uni(&[0.0, 1.0]);
        let y = uni(&[0.0, 1.0]);
        let w = SearchWindow::from_rows_unchecked(2, vec![0..1, 0..1]);
        let grid = CostGrid::compute(x.as_view(), y.as_view(), &w, &Metric::Manhattan);
        assert!(matches!(grid.total_cost(), Err(DtwError::InvalidWindow { .. })));
        assert!(matches!(grid.traceback(), Err(DtwError::InvalidWindow { .. })));
    }

    #[test]
    fn rolling_matches_grid() {
        let x = uni(&[1.0, 3.0, 5.0, 2.0, 7.0]);
        let y = uni(&[2.0, 4.0, 1.0, 6.0]);
        for w in [
            SearchWindow::full(5, 4),
            SearchWindow::from_rows(4, vec![0..2, 0..3, 1..3, 2..4, 3..4]).unwrap(),
        ] {
            let grid = CostGrid::compute(x.as_view(), y.as_view(), &w, &Metric::Manhattan);
            let rolled = rolling_cost(x.as_view(), y.as_view(), &w, &Metric::Manhattan, None);
            assert!((grid.total_cost().unwrap() - rolled).abs() < 1e-12);
        }
    }

    #[test]
    fn rolling_cutoff_abandons() {
        let x = uni(&[0.0, 0.0, 0.0, 0.0]);
        let y = uni(&[10.0, 10.0, 10.0, 10.0]);
        let w = SearchWindow::full(4, 4);
        let exact = rolling_cost(x.as_view(), y.as_view(), &w, &Metric::Manhattan, None);
        assert_eq!(exact, 40.0);
        let abandoned = rolling_cost(x.as_view(), y.as_view(), &w, &Metric::Manhattan, Some(5.0));
        assert_eq!(abandoned, f64::INFINITY);
        let kept = rolling_cost(x.as_view(), y.as_view(), &w, &Metric::Manhattan, Some(40.0));
        assert_eq!(kept, 40.0);
    }
}
