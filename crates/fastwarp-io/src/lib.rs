//! Fixture loading, CSV ingestion and JSON result artifacts for fastwarp.

mod domain;
mod error;
mod fixture;
mod reader;
mod writer;

pub use domain::{AlignmentMethod, AlignmentReport, ComparisonReport, ExperimentName, SeriesPair};
pub use error::IoError;
pub use fixture::FixtureReader;
pub use reader::PointCsvReader;
pub use writer::ResultWriter;
