//! FastDTW: multi-resolution approximate DTW (Salvador & Chan 2007).
//!
//! Both series are halved recursively until the shorter one has at most
//! `min_size` points. Exact DTW runs at that coarsest level; on the way back
//! up, each level projects the coarser warp path into a [`SearchWindow`]
//! widened by `radius` and runs windowed DTW inside it. Total work and memory
//! are O(radius * (n + m)).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, instrument};

use crate::coarsen::coarsen;
use crate::cost::WarpCost;
use crate::dtw::windowed;
use crate::error::DtwError;
use crate::grid::rolling_cost;
use crate::matrix::{DistanceMatrix, pairwise_with};
use crate::metric::PointMetric;
use crate::path::WarpPath;
use crate::project::project;
use crate::series::{Series, SeriesView, check_compatible};
use crate::window::SearchWindow;

/// FastDTW configuration.
///
/// Construct via [`FastDtw::new`], then chain `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter  | Default      |
/// |------------|--------------|
/// | `min_size` | `radius + 2` (saturating) |
/// | `cancel`   | none         |
#[derive(Debug, Clone)]
pub struct FastDtw {
    radius: usize,
    min_size: usize,
    cancel: Option<Arc<AtomicBool>>,
}

impl FastDtw {
    /// Create a FastDTW calculator with the given window radius.
    ///
    /// Larger radii trade runtime for accuracy; once the first projected
    /// window covers the whole grid the result equals exact DTW.
    #[must_use]
    pub fn new(radius: usize) -> Self {
        Self {
            radius,
            min_size: radius.saturating_add(2),
            cancel: None,
        }
    }

    /// Create a FastDTW calculator from a signed radius, as read from user input.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidParameter`] | `radius` is negative |
    pub fn from_signed(radius: i64) -> Result<Self, DtwError> {
        let radius = usize::try_from(radius).map_err(|_| DtwError::InvalidParameter {
            name: "radius",
            reason: format!("must be non-negative, got {radius}"),
        })?;
        Ok(Self::new(radius))
    }

    /// Set the series length at or below which exact DTW runs instead of recursing.
    ///
    /// Must be at least 1; validated when a computation starts.
    #[must_use]
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Attach a cancellation flag, checked on entry to every resolution level.
    #[must_use]
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Return the window radius.
    #[must_use]
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Return the base-case series length.
    #[must_use]
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Approximate the DTW cost between two series.
    ///
    /// The full-resolution pass keeps only two rows of the window in memory.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::DimensionMismatch`] | `x` and `y` differ in point dimensionality |
    /// | [`DtwError::InvalidParameter`] | `min_size` is zero |
    /// | [`DtwError::Cancelled`] | The cancellation flag was raised |
    /// | [`DtwError::InvalidWindow`] | Internal projection defect (never expected) |
    #[instrument(skip(self, x, y, metric), fields(n = x.len(), m = y.len(), radius = self.radius))]
    pub fn distance<M>(
        &self,
        x: SeriesView<'_>,
        y: SeriesView<'_>,
        metric: &M,
    ) -> Result<WarpCost, DtwError>
    where
        M: PointMetric + ?Sized,
    {
        self.validate(x, y)?;
        let window = self.window_for(x, y, metric, 0)?;
        let total = rolling_cost(x, y, &window, metric, None);
        if total.is_infinite() {
            return Err(DtwError::InvalidWindow {
                reason: "final cell is unreachable".into(),
            });
        }
        Ok(WarpCost::new(total))
    }

    /// Approximate the DTW cost and warp path between two series.
    ///
    /// # Errors
    ///
    /// Same conditions as [`FastDtw::distance`].
    #[instrument(skip(self, x, y, metric), fields(n = x.len(), m = y.len(), radius = self.radius))]
    pub fn distance_and_path<M>(
        &self,
        x: SeriesView<'_>,
        y: SeriesView<'_>,
        metric: &M,
    ) -> Result<(WarpCost, WarpPath), DtwError>
    where
        M: PointMetric + ?Sized,
    {
        self.validate(x, y)?;
        self.align(x, y, metric, 0)
    }

    /// Compute FastDTW costs for all unique pairs of `series`, in parallel.
    ///
    /// # Errors
    ///
    /// Returns the first error hit by any pair; see [`FastDtw::distance`].
    #[instrument(skip(self, series, metric), fields(n = series.len(), radius = self.radius))]
    pub fn pairwise<M>(&self, series: &[Series], metric: &M) -> Result<DistanceMatrix, DtwError>
    where
        M: PointMetric + Sync + ?Sized,
    {
        pairwise_with(series, |x, y| self.distance(x, y, metric))
    }

    fn validate(&self, x: SeriesView<'_>, y: SeriesView<'_>) -> Result<(), DtwError> {
        if self.min_size == 0 {
            return Err(DtwError::InvalidParameter {
                name: "min_size",
                reason: "must be at least 1".into(),
            });
        }
        check_compatible(x, y)
    }

    fn check_cancelled(&self, level: usize) -> Result<(), DtwError> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(DtwError::Cancelled { level }),
            _ => Ok(()),
        }
    }

    /// Warp path and cost at this resolution level.
    fn align<M>(
        &self,
        x: SeriesView<'_>,
        y: SeriesView<'_>,
        metric: &M,
        level: usize,
    ) -> Result<(WarpCost, WarpPath), DtwError>
    where
        M: PointMetric + ?Sized,
    {
        let window = self.window_for(x, y, metric, level)?;
        windowed(x, y, &window, metric)
    }

    /// Search window at this resolution level: the full grid in the base case,
    /// otherwise the projection of the next-coarser level's path.
    fn window_for<M>(
        &self,
        x: SeriesView<'_>,
        y: SeriesView<'_>,
        metric: &M,
        level: usize,
    ) -> Result<SearchWindow, DtwError>
    where
        M: PointMetric + ?Sized,
    {
        self.check_cancelled(level)?;
        let (n, m) = (x.len(), y.len());

        if n.min(m) <= self.min_size {
            debug!(level, n, m, "base case, exact DTW on full grid");
            return Ok(SearchWindow::full(n, m));
        }

        let cx = coarsen(x);
        let cy = coarsen(y);
        let (_, coarse_path) = self.align(cx.series.as_view(), cy.series.as_view(), metric, level + 1)?;
        let window = project(&coarse_path, &cx.record, &cy.record, self.radius)?;
        debug!(
            level,
            n,
            m,
            cells = window.len(),
            coarse_path_len = coarse_path.len(),
            "refining within projected window"
        );
        Ok(window)
    }
}

/// Approximate DTW cost and warp path between `x` and `y` with FastDTW.
///
/// Shorthand for `FastDtw::new(radius).distance_and_path(..)`.
///
/// # Errors
///
/// Same conditions as [`FastDtw::distance`].
pub fn fast_dtw<M>(
    x: &Series,
    y: &Series,
    radius: usize,
    metric: &M,
) -> Result<(WarpCost, WarpPath), DtwError>
where
    M: PointMetric + ?Sized,
{
    FastDtw::new(radius).distance_and_path(x.as_view(), y.as_view(), metric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtw::Dtw;
    use crate::metric::Metric;

    fn sine(n: usize, phase: f64) -> Series {
        Series::new(
            (0..n)
                .map(|i| {
                    let t = i as f64 * 0.15 + phase;
                    vec![t.sin(), (0.5 * t).cos()]
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn base_case_equals_exact() {
        let x = sine(6, 0.0);
        let y = sine(5, 0.3);
        let exact = Dtw::unconstrained()
            .distance_and_path(x.as_view(), y.as_view(), &Metric::Euclidean)
            .unwrap();
        let fast = FastDtw::new(5)
            .distance_and_path(x.as_view(), y.as_view(), &Metric::Euclidean)
            .unwrap();
        assert_eq!(exact, fast);
    }

    #[test]
    fn recursive_path_is_valid() {
        let x = sine(97, 0.0);
        let y = sine(64, 0.7);
        for radius in [0, 1, 3] {
            let (cost, path) = FastDtw::new(radius)
                .distance_and_path(x.as_view(), y.as_view(), &Metric::Euclidean)
                .unwrap();
            assert!(path.is_valid_for(97, 64), "radius {radius}");
            assert!(cost.value() >= 0.0);
        }
    }

    #[test]
    fn never_below_exact() {
        let x = sine(80, 0.0);
        let y = sine(75, 1.1);
        let exact = Dtw::unconstrained()
            .distance(x.as_view(), y.as_view(), &Metric::Euclidean)
            .unwrap();
        for radius in 0..6 {
            let fast = FastDtw::new(radius)
                .distance(x.as_view(), y.as_view(), &Metric::Euclidean)
                .unwrap();
            assert!(fast.value() >= exact.value() - 1e-9, "radius {radius}");
        }
    }

    #[test]
    fn large_radius_equals_exact() {
        let x = sine(40, 0.0);
        let y = sine(33, 0.9);
        let exact = Dtw::unconstrained()
            .distance(x.as_view(), y.as_view(), &Metric::Euclidean)
            .unwrap();
        let fast = FastDtw::new(40)
            .with_min_size(2)
            .distance(x.as_view(), y.as_view(), &Metric::Euclidean)
            .unwrap();
        assert!((fast.value() - exact.value()).abs() < 1e-12);
    }

    #[test]
    fn max_radius_equals_exact() {
        let x = sine(40, 0.0);
        let y = sine(33, 0.9);
        let exact = Dtw::unconstrained()
            .distance(x.as_view(), y.as_view(), &Metric::Euclidean)
            .unwrap();

        let fast = FastDtw::new(usize::MAX);
        assert_eq!(fast.min_size(), usize::MAX);
        let cost = fast
            .distance(x.as_view(), y.as_view(), &Metric::Euclidean)
            .unwrap();
        assert_eq!(cost, exact);
    }

    #[test]
    fn near_max_radius_recursion_equals_exact() {
        let x = sine(40, 0.0);
        let y = sine(33, 0.9);
        let exact = Dtw::unconstrained()
            .distance(x.as_view(), y.as_view(), &Metric::Euclidean)
            .unwrap();
        let fast = FastDtw::new(usize::MAX - 2).with_min_size(2);
        let cost = fast
            .distance(x.as_view(), y.as_view(), &Metric::Euclidean)
            .unwrap();
        assert!((cost.value() - exact.value()).abs() < 1e-12);
        let (_, path) = fast
            .distance_and_path(x.as_view(), y.as_view(), &Metric::Euclidean)
            .unwrap();
        assert!(path.is_valid_for(40, 33));
    }

    #[test]
    fn distance_matches_distance_and_path() {
        let x = sine(50, 0.0);
        let y = sine(61, 0.4);
        let fast = FastDtw::new(2);
        let only = fast.distance(x.as_view(), y.as_view(), &Metric::Manhattan).unwrap();
        let (with_path, _) = fast
            .distance_and_path(x.as_view(), y.as_view(), &Metric::Manhattan)
            .unwrap();
        assert!((only.value() - with_path.value()).abs() < 1e-9);
    }

    #[test]
    fn single_point_against_long_series() {
        let x = Series::new(vec![vec![0.0, 0.0]]).unwrap();
        let y = sine(30, 0.0);
        let (cost, path) = fast_dtw(&x, &y, 1, &Metric::Euclidean).unwrap();
        assert_eq!(path.len(), 30);
        assert!(path.is_valid_for(1, 30));
        assert!(cost.value() > 0.0);
    }

    #[test]
    fn negative_radius_rejected() {
        assert!(matches!(
            FastDtw::from_signed(-1),
            Err(DtwError::InvalidParameter { name: "radius", .. })
        ));
        assert_eq!(FastDtw::from_signed(3).unwrap().radius(), 3);
    }

    #[test]
    fn zero_min_size_rejected() {
        let x = sine(10, 0.0);
        let result = FastDtw::new(1)
            .with_min_size(0)
            .distance(x.as_view(), x.as_view(), &Metric::Euclidean);
        assert!(matches!(
            result,
            Err(DtwError::InvalidParameter { name: "min_size", .. })
        ));
    }

    #[test]
    fn cancellation_flag_aborts() {
        let flag = Arc::new(AtomicBool::new(true));
        let x = sine(20, 0.0);
        let result = FastDtw::new(1)
            .with_cancellation(Arc::clone(&flag))
            .distance(x.as_view(), x.as_view(), &Metric::Euclidean);
        assert!(matches!(result, Err(DtwError::Cancelled { level: 0 })));

        flag.store(false, Ordering::Relaxed);
        let cost = FastDtw::new(1)
            .with_cancellation(flag)
            .distance(x.as_view(), x.as_view(), &Metric::Euclidean)
            .unwrap();
        assert_eq!(cost.value(), 0.0);
    }

    #[test]
    fn pairwise_matches_individual() {
        let series = vec![sine(30, 0.0), sine(25, 0.5), sine(35, 1.0)];
        let fast = FastDtw::new(1);
        let matrix = fast.pairwise(&series, &Metric::Euclidean).unwrap();
        assert_eq!(matrix.len(), 3);
        let d20 = fast
            .distance(series[2].as_view(), series[0].as_view(), &Metric::Euclidean)
            .unwrap();
        assert_eq!(matrix.get(2, 0), d20);
        assert_eq!(matrix.get(0, 0), WarpCost::ZERO);
    }
}
