//! Error types for patient table construction.

use eicu_ingest::IngestError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that abort a build.
///
/// Only the core tables can fail a build; lab and vitals problems are
/// reported through [`crate::Enrichment::Skipped`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// Source discovery or core table loading failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Failed DataFrame operation while merging core tables.
    #[error("DataFrame operation failed: {0}")]
    DataFrame(#[from] PolarsError),
}

impl BuildError {
    /// Names of the missing source files, when that is why the build failed.
    pub fn missing_files(&self) -> Option<&[String]> {
        match self {
            Self::Ingest(IngestError::MissingFiles { missing, .. }) => Some(missing),
            _ => None,
        }
    }
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;
