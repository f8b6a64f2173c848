//! Warp path types for DTW alignment.

/// A single step in a warp path, aligning point `x` of the first series with
/// point `y` of the second series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WarpStep {
    /// Index in the first series.
    pub x: usize,
    /// Index in the second series.
    pub y: usize,
}

impl WarpStep {
    /// Create a step aligning `x` with `y`.
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<(usize, usize)> for WarpStep {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

/// An ordered sequence of warp steps from `(0, 0)` to `(n-1, m-1)`.
///
/// Monotonic in both coordinates; consecutive steps advance one or both
/// indices by exactly 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarpPath(Vec<WarpStep>);

impl WarpPath {
    pub(crate) fn new(steps: Vec<WarpStep>) -> Self {
        Self(steps)
    }

    /// Return the warp steps as a slice.
    #[must_use]
    pub fn steps(&self) -> &[WarpStep] {
        &self.0
    }

    /// Return the number of steps in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path contains no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the steps as `(x, y)` index pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(usize, usize)> {
        self.0.iter().map(|s| (s.x, s.y)).collect()
    }

    /// Check that this path starts at `(0, 0)`, ends at `(n-1, m-1)`, and every
    /// step advances one or both indices by exactly 1.
    #[must_use]
    pub fn is_valid_for(&self, n: usize, m: usize) -> bool {
        if n == 0 || m == 0 {
            return false;
        }
        let (Some(first), Some(last)) = (self.0.first(), self.0.last()) else {
            return false;
        };
        if *first != WarpStep::new(0, 0) || *last != WarpStep::new(n - 1, m - 1) {
            return false;
        }
        self.0.windows(2).all(|pair| {
            let dx = pair[1].x.wrapping_sub(pair[0].x);
            let dy = pair[1].y.wrapping_sub(pair[0].y);
            dx <= 1 && dy <= 1 && dx + dy >= 1
        })
    }
}

impl<'a> IntoIterator for &'a WarpPath {
    type Item = &'a WarpStep;
    type IntoIter = std::slice::Iter<'a, WarpStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
