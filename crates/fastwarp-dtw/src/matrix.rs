//! Lower-triangular matrix of pairwise warp costs.

use std::ops::Index;

use rayon::prelude::*;

use crate::cost::WarpCost;
use crate::error::DtwError;
use crate::series::{Series, SeriesView};

/// Symmetric cost matrix stored as a lower-triangular flat vector.
///
/// For `n` series, stores `n*(n-1)/2` costs. Access is symmetric:
/// `get(i, j) == get(j, i)`. The diagonal is always zero.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<WarpCost>,
}

impl DistanceMatrix {
    /// `data` must hold `n*(n-1)/2` costs laid out as `data[row*(row-1)/2 + col]`, `row > col`.
    pub(crate) fn from_raw(n: usize, data: Vec<WarpCost>) -> Self {
        debug_assert_eq!(data.len(), n * n.saturating_sub(1) / 2);
        Self { n, data }
    }

    /// Return the number of series in the matrix.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Return true if the matrix is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Return the cost between series `i` and series `j`; zero for `i == j`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n` or `j >= n`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> WarpCost {
        assert!(i < self.n, "row index {i} out of bounds for matrix of size {}", self.n);
        assert!(j < self.n, "column index {j} out of bounds for matrix of size {}", self.n);
        if i == j {
            return WarpCost::ZERO;
        }
        let (row, col) = if i > j { (i, j) } else { (j, i) };
        self.data[row * (row - 1) / 2 + col]
    }

    /// Iterate over all unique pairs `(i, j, cost)` where `i > j`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, WarpCost)> + '_ {
        (1..self.n).flat_map(move |i| (0..i).map(move |j| (i, j, self.data[i * (i - 1) / 2 + j])))
    }

    /// Return the costs from series `i` to every series, diagonal included.
    #[must_use]
    pub fn row(&self, i: usize) -> Vec<WarpCost> {
        (0..self.n).map(|j| self.get(i, j)).collect()
    }

    /// Return the index of the series closest to series `i`, ignoring `i` itself.
    #[must_use]
    pub fn nearest(&self, i: usize) -> Option<usize> {
        (0..self.n)
            .filter(|&j| j != i)
            .min_by(|&a, &b| self.get(i, a).total_cmp(&self.get(i, b)))
    }
}

impl Index<(usize, usize)> for DistanceMatrix {
    type Output = WarpCost;

    /// Strict lower or upper triangle only; use [`DistanceMatrix::get`] for the diagonal.
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        assert!(i != j, "cannot index diagonal, use get() instead");
        let (row, col) = if i > j { (i, j) } else { (j, i) };
        &self.data[row * (row - 1) / 2 + col]
    }
}

/// Evaluate `cost` on every unique pair of `series` in parallel.
pub(crate) fn pairwise_with<F>(series: &[Series], cost: F) -> Result<DistanceMatrix, DtwError>
where
    F: Fn(SeriesView<'_>, SeriesView<'_>) -> Result<WarpCost, DtwError> + Sync,
{
    let n = series.len();
    let total_pairs = n * n.saturating_sub(1) / 2;
    let views: Vec<SeriesView<'_>> = series.iter().map(Series::as_view).collect();

    let data = (0..total_pairs)
        .into_par_iter()
        .map(|flat_idx| {
            // flat_idx = i*(i-1)/2 + j, so i = floor((1 + sqrt(1 + 8*flat_idx)) / 2)
            let i = ((1.0 + (1.0 + 8.0 * flat_idx as f64).sqrt()) / 2.0).floor() as usize;
            let j = flat_idx - i * (i - 1) / 2;
            cost(views[i], views[j])
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DistanceMatrix::from_raw(n, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_matrix() -> DistanceMatrix {
        // Layout: (1,0), (2,0), (2,1), (3,0), (3,1), (3,2)
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 0.5]
            .into_iter()
            .map(WarpCost::new)
            .collect();
        DistanceMatrix::from_raw(4, data)
    }

    #[test]
    fn symmetric_access_with_zero_diagonal() {
        let m = make_matrix();
        for i in 0..4 {
            assert_eq!(m.get(i, i), WarpCost::ZERO);
            for j in 0..4 {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
        assert_eq!(m.get(2, 1).value(), 3.0);
        assert_eq!(m[(1, 3)].value(), 5.0);
    }

    #[test]
    fn iter_yields_lower_triangle() {
        let m = make_matrix();
        let pairs: Vec<_> = m.iter().collect();
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[0], (1, 0, WarpCost::new(1.0)));
        assert_eq!(pairs[5], (3, 2, WarpCost::new(0.5)));
    }

    #[test]
    fn row_and_nearest() {
        let m = make_matrix();
        let row0: Vec<f64> = m.row(0).iter().map(|c| c.value()).collect();
        assert_eq!(row0, vec![0.0, 1.0, 2.0, 4.0]);
        assert_eq!(m.nearest(0), Some(1));
        assert_eq!(m.nearest(3), Some(2));
    }

    #[test]
    fn pairwise_with_maps_flat_indices() {
        let series: Vec<Series> = (0..5)
            .map(|k| Series::univariate(vec![k as f64]).unwrap())
            .collect();
        let m = pairwise_with(&series, |x, y| {
            Ok(WarpCost::new((x.point(0)[0] - y.point(0)[0]).abs()))
        })
        .unwrap();
        for i in 0..5 {
            for j in 0..5 {
                assert_eq!(m.get(i, j).value(), (i as f64 - j as f64).abs());
            }
        }
    }

    #[test]
    fn pairwise_with_empty_and_single() {
        let empty = pairwise_with(&[], |_, _| Ok(WarpCost::ZERO)).unwrap();
        assert!(empty.is_empty());
        let single = [Series::univariate(vec![1.0]).unwrap()];
        let one = pairwise_with(&single, |_, _| Ok(WarpCost::ZERO)).unwrap();
        assert_eq!(one.len(), 1);
    }

    #[test]
    fn pairwise_with_propagates_errors() {
        let series: Vec<Series> = (0..3)
            .map(|k| Series::univariate(vec![k as f64]).unwrap())
            .collect();
        let result = pairwise_with(&series, |_, _| Err(DtwError::EmptyInput));
        assert!(matches!(result, Err(DtwError::EmptyInput)));
    }
}
