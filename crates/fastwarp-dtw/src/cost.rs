//! Alignment cost newtype.

use std::cmp::Ordering;
use std::fmt;

/// A non-negative cumulative alignment cost.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct WarpCost(f64);

impl WarpCost {
    /// Infinite cost, returned when a computation is abandoned at a cutoff.
    pub const INFINITY: Self = Self(f64::INFINITY);

    /// Zero cost.
    pub const ZERO: Self = Self(0.0);

    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw cost value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Return true if the cost is finite (the computation was not abandoned).
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for WarpCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

impl From<WarpCost> for f64 {
    fn from(cost: WarpCost) -> Self {
        cost.0
    }
}
