//! Error types for series validation and warping computation.

/// Errors from series validation, DTW and FastDTW computation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DtwError {
    /// Returned when a series with no points is provided.
    #[error("series must contain at least one point")]
    EmptyInput,

    /// Returned when a point has zero coordinates.
    #[error("point {index} has no coordinates")]
    EmptyPoint {
        /// Position of the offending point.
        index: usize,
    },

    /// Returned when points within a series, or across the two series, differ in dimensionality.
    #[error("dimension mismatch at point {index}: expected {expected} coordinates, got {got}")]
    DimensionMismatch {
        /// Dimensionality established by the first point (or the first series).
        expected: usize,
        /// Dimensionality actually found.
        got: usize,
        /// Position of the offending point.
        index: usize,
    },

    /// Returned when a coordinate is NaN, infinity, or negative infinity.
    #[error("series contains non-finite value at point {index}")]
    NonFiniteValue {
        /// Position of the first point holding a non-finite coordinate.
        index: usize,
    },

    /// Returned when a configuration parameter is out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// Returned when a search window admits no path from `(0, 0)` to `(n-1, m-1)`.
    #[error("search window admits no warp path: {reason}")]
    InvalidWindow {
        /// What was wrong with the window.
        reason: String,
    },

    /// Returned when a cancellation flag is raised between recursion levels.
    #[error("computation cancelled at resolution level {level}")]
    Cancelled {
        /// Recursion depth at which the flag was observed (0 = full resolution).
        level: usize,
    },
}
