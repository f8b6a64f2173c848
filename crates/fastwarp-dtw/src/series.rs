//! Multivariate time series types with validation guarantees.

use std::ops::Index;

use crate::error::DtwError;

/// Owned, validated multivariate time series.
///
/// Points are stored row-major in one flat buffer. Guaranteed non-empty, with
/// every point sharing the same non-zero dimensionality and all coordinates finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    dims: usize,
    values: Vec<f64>,
}

impl Series {
    /// Create a series from a list of points.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptyInput`] | `points` is empty |
    /// | [`DtwError::EmptyPoint`] | A point has zero coordinates |
    /// | [`DtwError::DimensionMismatch`] | A point's length differs from the first point's |
    /// | [`DtwError::NonFiniteValue`] | Any coordinate is NaN or infinite |
    pub fn new(points: Vec<Vec<f64>>) -> Result<Self, DtwError> {
        let dims = points.first().ok_or(DtwError::EmptyInput)?.len();
        if dims == 0 {
            return Err(DtwError::EmptyPoint { index: 0 });
        }
        let mut values = Vec::with_capacity(points.len() * dims);
        for (index, point) in points.iter().enumerate() {
            if point.len() != dims {
                return Err(DtwError::DimensionMismatch {
                    expected: dims,
                    got: point.len(),
                    index,
                });
            }
            values.extend_from_slice(point);
        }
        Self::from_flat(values, dims)
    }

    /// Create a series from a flat row-major buffer of `dims`-dimensional points.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptyInput`] | `values` is empty |
    /// | [`DtwError::EmptyPoint`] | `dims` is zero |
    /// | [`DtwError::DimensionMismatch`] | `values.len()` is not a multiple of `dims` |
    /// | [`DtwError::NonFiniteValue`] | Any coordinate is NaN or infinite |
    pub fn from_flat(values: Vec<f64>, dims: usize) -> Result<Self, DtwError> {
        SeriesView::new(&values, dims)?;
        Ok(Self { dims, values })
    }

    /// Create a one-dimensional series, one point per value.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Series::from_flat`] with `dims = 1`.
    pub fn univariate(values: Vec<f64>) -> Result<Self, DtwError> {
        Self::from_flat(values, 1)
    }

    /// Wrap an already-validated buffer. For internal producers such as the coarsener.
    pub(crate) fn from_flat_unchecked(values: Vec<f64>, dims: usize) -> Self {
        debug_assert!(dims > 0 && !values.is_empty() && values.len() % dims == 0);
        Self { dims, values }
    }

    /// Borrow this series as a zero-copy view.
    #[must_use]
    pub fn as_view(&self) -> SeriesView<'_> {
        SeriesView::new_unchecked(&self.values, self.dims)
    }

    /// Return the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len() / self.dims
    }

    /// Return true if the series has no points.
    ///
    /// A [`Series`] built through its validating constructors is never empty;
    /// provided to satisfy the `len_without_is_empty` convention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return the dimensionality of every point.
    #[must_use]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Return point `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    #[must_use]
    pub fn point(&self, i: usize) -> &[f64] {
        &self.values[i * self.dims..(i + 1) * self.dims]
    }

    /// Iterate over points in temporal order.
    pub fn points(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.dims)
    }

    /// Consume and return the flat row-major buffer.
    #[must_use]
    pub fn into_flat(self) -> Vec<f64> {
        self.values
    }
}

impl TryFrom<Vec<Vec<f64>>> for Series {
    type Error = DtwError;

    fn try_from(points: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl Index<usize> for Series {
    type Output = [f64];

    fn index(&self, index: usize) -> &Self::Output {
        self.point(index)
    }
}

/// Borrowed, validated view into a multivariate series. Zero-copy reference.
#[derive(Debug, Clone, Copy)]
pub struct SeriesView<'a> {
    dims: usize,
    values: &'a [f64],
}

impl<'a> SeriesView<'a> {
    /// Create a new view over a flat row-major buffer, validating it.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptyInput`] | `values` is empty |
    /// | [`DtwError::EmptyPoint`] | `dims` is zero |
    /// | [`DtwError::DimensionMismatch`] | `values.len()` is not a multiple of `dims` |
    /// | [`DtwError::NonFiniteValue`] | Any coordinate is NaN or infinite |
    pub fn new(values: &'a [f64], dims: usize) -> Result<Self, DtwError> {
        if values.is_empty() {
            return Err(DtwError::EmptyInput);
        }
        if dims == 0 {
            return Err(DtwError::EmptyPoint { index: 0 });
        }
        if values.len() % dims != 0 {
            let index = values.len() / dims;
            return Err(DtwError::DimensionMismatch {
                expected: dims,
                got: values.len() % dims,
                index,
            });
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(DtwError::NonFiniteValue { index: pos / dims });
        }
        Ok(Self { dims, values })
    }

    pub(crate) fn new_unchecked(values: &'a [f64], dims: usize) -> Self {
        Self { dims, values }
    }

    /// Return the underlying flat buffer.
    #[must_use]
    pub fn as_flat(&self) -> &'a [f64] {
        self.values
    }

    /// Return the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len() / self.dims
    }

    /// Return true if the view has no points.
    ///
    /// A [`SeriesView`] built through [`SeriesView::new`] is never empty;
    /// provided to satisfy the `len_without_is_empty` convention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return the dimensionality of every point.
    #[must_use]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Return point `i`.
    #[inline]
    #[must_use]
    pub fn point(&self, i: usize) -> &'a [f64] {
        &self.values[i * self.dims..(i + 1) * self.dims]
    }

    /// Return a view over the first `min(n, len)` points.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::EmptyInput`] if `n` is zero.
    pub fn head(&self, n: usize) -> Result<SeriesView<'a>, DtwError> {
        if n == 0 {
            return Err(DtwError::EmptyInput);
        }
        let end = n.min(self.len()) * self.dims;
        Ok(Self::new_unchecked(&self.values[..end], self.dims))
    }

    /// Copy the viewed points into an owned [`Series`].
    #[must_use]
    pub fn to_series(&self) -> Series {
        Series::from_flat_unchecked(self.values.to_vec(), self.dims)
    }
}

impl Index<usize> for SeriesView<'_> {
    type Output = [f64];

    fn index(&self, index: usize) -> &Self::Output {
        self.point(index)
    }
}

/// Check that two series can be aligned point-for-point.
pub(crate) fn check_compatible(x: SeriesView<'_>, y: SeriesView<'_>) -> Result<(), DtwError> {
    if x.dims() != y.dims() {
        return Err(DtwError::DimensionMismatch {
            expected: x.dims(),
            got: y.dims(),
            index: 0,
        });
    }
    Ok(())
}
