//! Point-to-point distance functions.

use std::fmt;
use std::str::FromStr;

use crate::error::DtwError;

/// A distance between two points of equal dimensionality.
///
/// Implementations must return a non-negative value and must be safe to call
/// repeatedly with the same arguments. Symmetry and `d(p, p) = 0` are not
/// required, but the cost identities of DTW only hold when they are.
///
/// Any `Fn(&[f64], &[f64]) -> f64` is a metric, so closures can be passed directly:
///
/// ```
/// use fastwarp_dtw::{Dtw, Series};
///
/// let x = Series::univariate(vec![0.0, 1.0, 2.0]).unwrap();
/// let y = Series::univariate(vec![0.0, 2.0]).unwrap();
/// let abs = |a: &[f64], b: &[f64]| (a[0] - b[0]).abs();
/// let cost = Dtw::unconstrained().distance(x.as_view(), y.as_view(), &abs).unwrap();
/// assert_eq!(cost.value(), 1.0);
/// ```
pub trait PointMetric {
    /// Compute the distance between `a` and `b`.
    ///
    /// Callers guarantee `a.len() == b.len()`.
    fn distance(&self, a: &[f64], b: &[f64]) -> f64;

    /// Compute the distance after checking that both points have the same length.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::DimensionMismatch`] | `a.len() != b.len()` |
    fn checked_distance(&self, a: &[f64], b: &[f64]) -> Result<f64, DtwError> {
        if a.len() != b.len() {
            return Err(DtwError::DimensionMismatch {
                expected: a.len(),
                got: b.len(),
                index: 0,
            });
        }
        Ok(self.distance(a, b))
    }
}

impl<F> PointMetric for F
where
    F: Fn(&[f64], &[f64]) -> f64,
{
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        self(a, b)
    }
}

/// Built-in point metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Metric {
    /// L2 norm of the difference.
    #[default]
    Euclidean,
    /// Squared L2 norm of the difference.
    SquaredEuclidean,
    /// L1 norm of the difference.
    Manhattan,
    /// L-infinity norm of the difference.
    Chebyshev,
}

impl PointMetric for Metric {
    #[inline]
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        let diffs = a.iter().zip(b).map(|(p, q)| p - q);
        match self {
            Self::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            Self::SquaredEuclidean => diffs.map(|d| d * d).sum(),
            Self::Manhattan => diffs.map(f64::abs).sum(),
            Self::Chebyshev => diffs.map(f64::abs).fold(0.0, f64::max),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Euclidean => "euclidean",
            Self::SquaredEuclidean => "squared-euclidean",
            Self::Manhattan => "manhattan",
            Self::Chebyshev => "chebyshev",
        })
    }
}

impl FromStr for Metric {
    type Err = DtwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Self::Euclidean),
            "squared-euclidean" | "sqeuclidean" => Ok(Self::SquaredEuclidean),
            "manhattan" | "l1" => Ok(Self::Manhattan),
            "chebyshev" | "maximum" => Ok(Self::Chebyshev),
            other => Err(DtwError::InvalidParameter {
                name: "metric",
                reason: format!("unknown metric \"{other}\""),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_3_4_5() {
        assert!((Metric::Euclidean.distance(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn squared_euclidean() {
        assert_eq!(Metric::SquaredEuclidean.distance(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
    }

    #[test]
    fn manhattan() {
        assert_eq!(Metric::Manhattan.distance(&[1.0, -1.0], &[3.0, 4.0]), 7.0);
    }

    #[test]
    fn chebyshev() {
        assert_eq!(Metric::Chebyshev.distance(&[1.0, -1.0], &[3.0, 4.0]), 5.0);
    }

    #[test]
    fn zero_on_equal_points() {
        let p = [1.5, -2.0, 7.25];
        for metric in [
            Metric::Euclidean,
            Metric::SquaredEuclidean,
            Metric::Manhattan,
            Metric::Chebyshev,
        ] {
            assert_eq!(metric.distance(&p, &p), 0.0, "{metric}");
        }
    }

    #[test]
    fn checked_distance_rejects_unequal_lengths() {
        let result = Metric::Euclidean.checked_distance(&[1.0, 2.0], &[1.0]);
        assert!(matches!(
            result,
            Err(DtwError::DimensionMismatch { expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn closure_is_a_metric() {
        let abs = |a: &[f64], b: &[f64]| (a[0] - b[0]).abs();
        assert_eq!(abs.checked_distance(&[2.0], &[5.0]).unwrap(), 3.0);
    }

    #[test]
    fn parse_and_display_roundtrip() {
        for metric in [
            Metric::Euclidean,
            Metric::SquaredEuclidean,
            Metric::Manhattan,
            Metric::Chebyshev,
        ] {
            assert_eq!(metric.to_string().parse::<Metric>().unwrap(), metric);
        }
        assert_eq!("L1".parse::<Metric>().unwrap(), Metric::Manhattan);
        assert!(matches!(
            "cosine".parse::<Metric>(),
            Err(DtwError::InvalidParameter { name: "metric", .. })
        ));
    }
}
