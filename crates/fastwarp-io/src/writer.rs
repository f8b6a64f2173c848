//! JSON result writer for alignment and comparison outputs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{AlignmentReport, ComparisonReport, ExperimentName};

/// Writes alignment results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_alignment.json` and
/// `{experiment}_comparison.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write a single alignment result to `{experiment}_alignment.json`.
    ///
    /// Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_alignment(&self, report: &AlignmentReport) -> Result<PathBuf, IoError> {
        let artifact = Artifact {
            experiment: self.experiment.as_str(),
            result: report,
        };
        let path = self.write("alignment", &artifact)?;
        info!(path = %path.display(), cost = report.cost, "alignment result written");
        Ok(path)
    }

    /// Write an exact-vs-FastDTW comparison to `{experiment}_comparison.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_comparison(&self, report: &ComparisonReport) -> Result<PathBuf, IoError> {
        let artifact = Artifact {
            experiment: self.experiment.as_str(),
            result: report,
        };
        let path = self.write("comparison", &artifact)?;
        info!(
            path = %path.display(),
            relative_error = ?report.relative_error,
            "comparison result written"
        );
        Ok(path)
    }

    fn write<T: Serialize>(&self, kind: &str, artifact: &T) -> Result<PathBuf, IoError> {
        let path = self
            .output_dir
            .join(format!("{}_{kind}.json", self.experiment.as_str()));
        let json = serde_json::to_string_pretty(artifact).expect("serialization cannot fail");
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }
}

/// Report fields flattened next to the experiment name.
#[derive(Serialize)]
struct Artifact<'a, T> {
    experiment: &'a str,
    #[serde(flatten)]
    result: &'a T,
}
