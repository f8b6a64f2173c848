//! JSON fixture reader for aligned series pairs.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use fastwarp_dtw::{DtwError, Series};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::IoError;
use crate::domain::SeriesPair;

#[derive(Deserialize)]
struct RawFixture {
    x: Vec<Vec<f64>>,
    y: Vec<Vec<f64>>,
}

/// Reads a pair of multivariate series from a JSON fixture.
///
/// Expected format: `{"x": [[f64, ..], ..], "y": [[f64, ..], ..]}`. Any
/// other top-level keys are ignored.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::JsonParse`] | Malformed JSON or missing `x`/`y` |
/// | [`IoError::InvalidSeries`] | Empty series, ragged points or differing dimensionality |
pub struct FixtureReader {
    path: PathBuf,
}

impl FixtureReader {
    /// Create a new reader for the given fixture path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the fixture, returning a [`SeriesPair`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<SeriesPair, IoError> {
        let file = File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;
        let raw: RawFixture =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| IoError::JsonParse {
                path: self.path.clone(),
                source: e,
            })?;

        let x = self.series("x", raw.x)?;
        let y = self.series("y", raw.y)?;
        if x.dims() != y.dims() {
            return Err(IoError::InvalidSeries {
                path: self.path.clone(),
                name: "y",
                source: DtwError::DimensionMismatch {
                    expected: x.dims(),
                    got: y.dims(),
                    index: 0,
                },
            });
        }

        info!(n = x.len(), m = y.len(), dims = x.dims(), "fixture loaded");
        Ok(SeriesPair { x, y })
    }

    fn series(&self, name: &'static str, points: Vec<Vec<f64>>) -> Result<Series, IoError> {
        Series::new(points).map_err(|e| IoError::InvalidSeries {
            path: self.path.clone(),
            name,
            source: e,
        })
    }
}
