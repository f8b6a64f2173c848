//! Halving a series' resolution by averaging adjacent points.

use std::ops::Range;

use crate::series::{Series, SeriesView};

/// Provenance of a coarsened series: for each coarse index, the contiguous
/// range of finer indices it was averaged from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionRecord {
    fine_len: usize,
}

impl ReductionRecord {
    /// Record for a series of `fine_len` points reduced pairwise.
    #[must_use]
    pub fn new(fine_len: usize) -> Self {
        Self { fine_len }
    }

    /// Return the length of the finer series.
    #[must_use]
    pub fn fine_len(&self) -> usize {
        self.fine_len
    }

    /// Return the length of the coarse series, `ceil(fine_len / 2)`.
    #[must_use]
    pub fn coarse_len(&self) -> usize {
        self.fine_len.div_ceil(2)
    }

    /// Return the finer indices summarized by coarse index `k`: `{2k, 2k+1}`,
    /// or `{2k}` for a trailing unpaired point.
    ///
    /// # Panics
    ///
    /// Panics if `k >= self.coarse_len()`.
    #[must_use]
    pub fn span(&self, k: usize) -> Range<usize> {
        assert!(
            k < self.coarse_len(),
            "coarse index {k} out of bounds for {} coarse points",
            self.coarse_len()
        );
        2 * k..(2 * k + 2).min(self.fine_len)
    }
}

/// A half-resolution series together with its [`ReductionRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct Coarsened {
    /// The averaged series.
    pub series: Series,
    /// Mapping from coarse indices back to the finer series.
    pub record: ReductionRecord,
}

/// Reduce `series` to `ceil(len / 2)` points, each the element-wise mean of two
/// consecutive points. A trailing unpaired point is averaged with itself, so it
/// is carried through unchanged. Temporal order is preserved.
#[must_use]
pub fn coarsen(series: SeriesView<'_>) -> Coarsened {
    let dims = series.dims();
    let record = ReductionRecord::new(series.len());
    let mut values = Vec::with_capacity(record.coarse_len() * dims);

    for k in 0..record.coarse_len() {
        let span = record.span(k);
        let a = series.point(span.start);
        let b = series.point(span.end - 1);
        values.extend(a.iter().zip(b).map(|(p, q)| (p + q) / 2.0));
    }

    Coarsened {
        series: Series::from_flat_unchecked(values, dims),
        record,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_length_halves() {
        let s = Series::univariate(vec![1.0, 3.0, 5.0, 7.0]).unwrap();
        let c = coarsen(s.as_view());
        assert_eq!(c.series.into_flat(), vec![2.0, 6.0]);
        assert_eq!(c.record.span(0), 0..2);
        assert_eq!(c.record.span(1), 2..4);
    }

    #[test]
    fn odd_length_carries_trailing_point() {
        let s = Series::univariate(vec![1.0, 3.0, 5.0, 7.0, 9.0]).unwrap();
        let c = coarsen(s.as_view());
        assert_eq!(c.series.into_flat(), vec![2.0, 6.0, 9.0]);
        assert_eq!(c.record.coarse_len(), 3);
        assert_eq!(c.record.span(2), 4..5);
    }

    #[test]
    fn singleton_is_unchanged() {
        let s = Series::new(vec![vec![4.0, -2.0]]).unwrap();
        let c = coarsen(s.as_view());
        assert_eq!(c.series, s);
        assert_eq!(c.record.span(0), 0..1);
    }

    #[test]
    fn averages_each_coordinate() {
        let s = Series::new(vec![vec![0.0, 10.0], vec![2.0, 20.0], vec![4.0, 30.0]]).unwrap();
        let c = coarsen(s.as_view());
        assert_eq!(c.series.dims(), 2);
        assert_eq!(c.series.point(0), &[1.0, 15.0]);
        assert_eq!(c.series.point(1), &[4.0, 30.0]);
    }

    #[test]
    fn spans_partition_fine_indices() {
        for fine_len in 1..12 {
            let record = ReductionRecord::new(fine_len);
            let covered: Vec<usize> = (0..record.coarse_len()).flat_map(|k| record.span(k)).collect();
            assert_eq!(covered, (0..fine_len).collect::<Vec<_>>());
        }
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn span_out_of_bounds_panics() {
        let _ = ReductionRecord::new(4).span(2);
    }
}
