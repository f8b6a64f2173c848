//! CSV point reader with column selection and full input validation.

use std::path::{Path, PathBuf};

use fastwarp_dtw::Series;
use tracing::{debug, info, instrument};

use crate::IoError;

/// Reads a multivariate series from a headered CSV file, one point per row.
///
/// By default every column is a coordinate. [`with_columns`](Self::with_columns)
/// restricts the point to the named columns, in the given order, so a GPS log
/// such as `Time,Latitude,Longitude,Speed` can be read as 2-D points.
/// [`with_take`](Self::with_take) stops after the first N data rows.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | A requested column is not in the header |
/// | [`IoError::EmptyDataset`] | Zero data rows after header, or zero columns selected |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::NonFiniteValue`] | A selected cell is NaN, Inf, or unparseable |
pub struct PointCsvReader {
    path: PathBuf,
    columns: Option<Vec<String>>,
    take: Option<usize>,
}

impl PointCsvReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            columns: None,
            take: None,
        }
    }

    /// Read only the named columns, in this order.
    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Read at most `n` data rows.
    #[must_use]
    pub fn with_take(mut self, n: usize) -> Self {
        self.take = Some(n);
        self
    }

    /// Read and validate the CSV file, returning a [`Series`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Series, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so short rows reach the InconsistentRowLength check.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?.clone();
        let expected_cols = header.len();
        let selected = self.select(&header)?;
        if selected.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }
        debug!(expected_cols, dims = selected.len(), "read CSV header");

        let limit = self.take.unwrap_or(usize::MAX);
        let mut values = Vec::new();
        let mut rows = 0usize;

        for (row_index, result) in rdr.records().take(limit).enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;
            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            for &col in &selected {
                let raw = record.get(col).unwrap_or("");
                let value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| IoError::NonFiniteValue {
                        path: self.path.clone(),
                        row_index,
                        column: header.get(col).unwrap_or("").to_string(),
                        raw: raw.to_string(),
                    })?;
                values.push(value);
            }
            rows += 1;
        }

        if rows == 0 {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let series = Series::from_flat(values, selected.len())?;
        info!(n_points = rows, dims = series.dims(), "series loaded");
        Ok(series)
    }

    /// Header indices of the coordinates to read.
    fn select(&self, header: &csv::StringRecord) -> Result<Vec<usize>, IoError> {
        let Some(columns) = &self.columns else {
            return Ok((0..header.len()).collect());
        };
        columns
            .iter()
            .map(|name| {
                header
                    .iter()
                    .position(|h| h == name)
                    .ok_or_else(|| IoError::MissingColumn {
                        path: self.path.clone(),
                        column: name.clone(),
                    })
            })
            .collect()
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}
