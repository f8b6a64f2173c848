//! Domain types for fastwarp-io.

use fastwarp_dtw::Series;
use serde::{Deserialize, Serialize};

use crate::IoError;

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Two series to be aligned, as loaded from a fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPair {
    /// Series indexed by rows of the cost grid.
    pub x: Series,
    /// Series indexed by columns of the cost grid.
    pub y: Series,
}

/// Which algorithm produced an [`AlignmentReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMethod {
    /// Exact DTW, optionally banded.
    Exact,
    /// Multi-resolution FastDTW.
    Fast,
}

/// Outcome of a single alignment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub method: AlignmentMethod,
    /// Display name of the point metric, e.g. `euclidean`.
    pub metric: String,
    /// FastDTW radius, or the Sakoe-Chiba band radius for exact runs.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub radius: Option<usize>,
    pub cost: f64,
    pub n: usize,
    pub m: usize,
    /// Warp path as `(i, j)` pairs, when requested.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub path: Option<Vec<(usize, usize)>>,
    pub elapsed_ms: f64,
}

/// Exact and approximate runs over the same pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub exact: AlignmentReport,
    pub fast: AlignmentReport,
    /// `(fast - exact) / exact`; zero when both costs are zero, `None` when
    /// only the exact cost is zero.
    pub relative_error: Option<f64>,
    /// `exact.elapsed_ms / fast.elapsed_ms`; `None` when the fast run took no measurable time.
    pub speedup: Option<f64>,
}

impl ComparisonReport {
    /// Pair two reports and derive the error and speedup figures.
    #[must_use]
    pub fn new(exact: AlignmentReport, fast: AlignmentReport) -> Self {
        let relative_error = match (exact.cost, fast.cost) {
            (e, f) if e == 0.0 && f == 0.0 => Some(0.0),
            (e, _) if e == 0.0 => None,
            (e, f) => Some((f - e) / e),
        };
        let speedup = (fast.elapsed_ms > 0.0).then(|| exact.elapsed_ms / fast.elapsed_ms);
        Self {
            exact,
            fast,
            relative_error,
            speedup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(method: AlignmentMethod, cost: f64, elapsed_ms: f64) -> AlignmentReport {
        AlignmentReport {
            method,
            metric: "euclidean".into(),
            radius: Some(1),
            cost,
            n: 4,
            m: 3,
            path: None,
            elapsed_ms,
        }
    }

    #[test]
    fn experiment_name_valid() {
        let name = ExperimentName::new("gps-track_01".to_string());
        assert!(name.is_ok());
        assert_eq!(name.unwrap().as_str(), "gps-track_01");
    }

    #[test]
    fn experiment_name_rejects_empty() {
        let name = ExperimentName::new(String::new());
        assert!(matches!(name, Err(IoError::InvalidExperimentName { .. })));
    }

    #[test]
    fn experiment_name_rejects_special_chars() {
        let name = ExperimentName::new("my experiment!".to_string());
        assert!(matches!(name, Err(IoError::InvalidExperimentName { .. })));
    }

    #[test]
    fn comparison_relative_error_and_speedup() {
        let c = ComparisonReport::new(
            report(AlignmentMethod::Exact, 2.0, 10.0),
            report(AlignmentMethod::Fast, 2.5, 2.0),
        );
        assert!((c.relative_error.unwrap() - 0.25).abs() < 1e-12);
        assert!((c.speedup.unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn comparison_zero_costs() {
        let c = ComparisonReport::new(
            report(AlignmentMethod::Exact, 0.0, 1.0),
            report(AlignmentMethod::Fast, 0.0, 1.0),
        );
        assert_eq!(c.relative_error, Some(0.0));
    }

    #[test]
    fn comparison_undefined_ratios_round_trip() {
        let c = ComparisonReport::new(
            report(AlignmentMethod::Exact, 0.0, 3.0),
            report(AlignmentMethod::Fast, 1.0, 0.0),
        );
        assert_eq!(c.relative_error, None);
        assert_eq!(c.speedup, None);

        let json = serde_json::to_string(&c).unwrap();
        let back: ComparisonReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn method_serializes_lowercase() {
        let json = serde_json::to_string(&AlignmentMethod::Fast).unwrap();
        assert_eq!(json, "\"fast\"");
    }
}
