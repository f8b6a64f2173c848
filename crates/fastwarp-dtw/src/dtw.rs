//! Exact and windowed DTW computation.

use tracing::instrument;

use crate::constraint::BandConstraint;
use crate::cost::WarpCost;
use crate::error::DtwError;
use crate::grid::{CostGrid, rolling_cost};
use crate::matrix::{DistanceMatrix, pairwise_with};
use crate::metric::PointMetric;
use crate::path::WarpPath;
use crate::series::{Series, SeriesView, check_compatible};
use crate::window::SearchWindow;

/// Immutable exact-DTW configuration. Thread-safe and copyable.
///
/// Cost is the plain sum of point distances along the optimal warp path:
///
/// ```text
/// D[0,0] = d(x0, y0)
/// D[i,j] = d(xi, yj) + min(D[i-1,j-1], D[i-1,j], D[i,j-1])
/// ```
///
/// Ties between predecessors resolve diagonal first, then vertical
/// (`(i-1, j)`), then horizontal (`(i, j-1)`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dtw {
    constraint: BandConstraint,
}

impl Dtw {
    /// Create an unconstrained DTW calculator over the full `n x m` grid.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self {
            constraint: BandConstraint::Unconstrained,
        }
    }

    /// Create a DTW calculator with a Sakoe-Chiba band constraint.
    #[must_use]
    pub fn with_sakoe_chiba(radius: usize) -> Self {
        Self {
            constraint: BandConstraint::SakoeChibaRadius(radius),
        }
    }

    /// Create a DTW calculator from an existing [`BandConstraint`].
    #[must_use]
    pub fn from_constraint(constraint: BandConstraint) -> Self {
        Self { constraint }
    }

    /// Return the band constraint configuration.
    #[must_use]
    pub fn constraint(&self) -> BandConstraint {
        self.constraint
    }

    /// Compute the DTW cost between two series.
    ///
    /// Uses a rolling two-row buffer rather than the full cost grid: O(n * bw)
    /// time and O(bw) space, where `bw` is the band width (`m` unconstrained).
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::DimensionMismatch`] | `x` and `y` differ in point dimensionality |
    #[instrument(skip(x, y, metric), fields(n = x.len(), m = y.len()))]
    pub fn distance<M>(
        &self,
        x: SeriesView<'_>,
        y: SeriesView<'_>,
        metric: &M,
    ) -> Result<WarpCost, DtwError>
    where
        M: PointMetric + ?Sized,
    {
        check_compatible(x, y)?;
        let window = self.constraint.window(x.len(), y.len());
        Ok(WarpCost::new(rolling_cost(x, y, &window, metric, None)))
    }

    /// Compute the DTW cost and the optimal warp path between two series.
    ///
    /// Materializes the (banded) cost grid with backpointers: O(n * bw) time
    /// and space. Use [`distance`][Dtw::distance] when only the cost is needed.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::DimensionMismatch`] | `x` and `y` differ in point dimensionality |
    #[instrument(skip(x, y, metric), fields(n = x.len(), m = y.len()))]
    pub fn distance_and_path<M>(
        &self,
        x: SeriesView<'_>,
        y: SeriesView<'_>,
        metric: &M,
    ) -> Result<(WarpCost, WarpPath), DtwError>
    where
        M: PointMetric + ?Sized,
    {
        check_compatible(x, y)?;
        let window = self.constraint.window(x.len(), y.len());
        windowed(x, y, &window, metric)
    }

    /// Compute the DTW cost with early abandoning.
    ///
    /// Returns [`WarpCost::INFINITY`] once the cost is certain to exceed
    /// `cutoff`. This is exact: a finite result equals [`distance`][Dtw::distance].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::DimensionMismatch`] | `x` and `y` differ in point dimensionality |
    #[instrument(skip(x, y, metric), fields(n = x.len(), m = y.len()))]
    pub fn distance_with_cutoff<M>(
        &self,
        x: SeriesView<'_>,
        y: SeriesView<'_>,
        metric: &M,
        cutoff: f64,
    ) -> Result<WarpCost, DtwError>
    where
        M: PointMetric + ?Sized,
    {
        check_compatible(x, y)?;
        let window = self.constraint.window(x.len(), y.len());
        Ok(WarpCost::new(rolling_cost(
            x,
            y,
            &window,
            metric,
            Some(cutoff),
        )))
    }

    /// Compute pairwise DTW costs for a collection of series.
    ///
    /// Returns a symmetric [`DistanceMatrix`] over all unique pairs, computed
    /// in parallel with rayon.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::DimensionMismatch`] | Two series differ in point dimensionality |
    #[instrument(skip(series, metric), fields(n = series.len()))]
    pub fn pairwise<M>(&self, series: &[Series], metric: &M) -> Result<DistanceMatrix, DtwError>
    where
        M: PointMetric + Sync + ?Sized,
    {
        pairwise_with(series, |x, y| self.distance(x, y, metric))
    }

    /// Compute the DTW cost restricted to a caller-supplied window.
    ///
    /// The band constraint of `self` is ignored; `window` alone decides which
    /// cells are visited. Runs in O(|window|) time and O(widest row) space.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::DimensionMismatch`] | `x` and `y` differ in point dimensionality |
    /// | [`DtwError::InvalidWindow`] | `window` is not `x.len() x y.len()`, or admits no path |
    pub fn distance_in_window<M>(
        &self,
        x: SeriesView<'_>,
        y: SeriesView<'_>,
        window: &SearchWindow,
        metric: &M,
    ) -> Result<WarpCost, DtwError>
    where
        M: PointMetric + ?Sized,
    {
        check_compatible(x, y)?;
        check_window_shape(x, y, window)?;
        window.check_connected()?;
        let total = rolling_cost(x, y, window, metric, None);
        if total.is_infinite() {
            return Err(DtwError::InvalidWindow {
                reason: "final cell is unreachable".into(),
            });
        }
        Ok(WarpCost::new(total))
    }

    /// Compute the DTW cost and warp path restricted to a caller-supplied window.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::DimensionMismatch`] | `x` and `y` differ in point dimensionality |
    /// | [`DtwError::InvalidWindow`] | `window` is not `x.len() x y.len()`, or admits no path |
    pub fn distance_and_path_in_window<M>(
        &self,
        x: SeriesView<'_>,
        y: SeriesView<'_>,
        window: &SearchWindow,
        metric: &M,
    ) -> Result<(WarpCost, WarpPath), DtwError>
    where
        M: PointMetric + ?Sized,
    {
        check_compatible(x, y)?;
        check_window_shape(x, y, window)?;
        window.check_connected()?;
        windowed(x, y, window, metric)
    }
}

/// Exact DTW cost and warp path between `x` and `y` over the full grid.
///
/// Shorthand for `Dtw::unconstrained().distance_and_path(..)`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DtwError::DimensionMismatch`] | `x` and `y` differ in point dimensionality |
pub fn exact_dtw<M>(x: &Series, y: &Series, metric: &M) -> Result<(WarpCost, WarpPath), DtwError>
where
    M: PointMetric + ?Sized,
{
    Dtw::unconstrained().distance_and_path(x.as_view(), y.as_view(), metric)
}

fn check_window_shape(
    x: SeriesView<'_>,
    y: SeriesView<'_>,
    window: &SearchWindow,
) -> Result<(), DtwError> {
    if window.n_rows() != x.len() || window.n_cols() != y.len() {
        return Err(DtwError::InvalidWindow {
            reason: format!(
                "window is {}x{} but series are {}x{}",
                window.n_rows(),
                window.n_cols(),
                x.len(),
                y.len()
            ),
        });
    }
    Ok(())
}

/// Fill the cost grid over `window` and trace the optimal path back.
pub(crate) fn windowed<M>(
    x: SeriesView<'_>,
    y: SeriesView<'_>,
    window: &SearchWindow,
    metric: &M,
) -> Result<(WarpCost, WarpPath), DtwError>
where
    M: PointMetric + ?Sized,
{
    let grid = CostGrid::compute(x, y, window, metric);
    let total = grid.total_cost()?;
    let path = grid.traceback()?;
    debug_assert!(path.is_valid_for(x.len(), y.len()));
    Ok((WarpCost::new(total), path))
}
