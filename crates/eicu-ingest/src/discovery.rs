//! Source file discovery for an eICU data directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// File names of the five eICU source tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFileNames {
    pub patient: String,
    pub apache_result: String,
    pub apache_vars: String,
    pub labs: String,
    pub vitals: String,
}

impl Default for SourceFileNames {
    fn default() -> Self {
        Self {
            patient: "patient.csv".to_string(),
            apache_result: "apachePatientResult.csv".to_string(),
            apache_vars: "apacheApsVar.csv".to_string(),
            labs: "lab.csv".to_string(),
            vitals: "vitalPeriodic.csv".to_string(),
        }
    }
}

impl SourceFileNames {
    /// Names in load order.
    fn in_order(&self) -> [&str; 5] {
        [
            &self.patient,
            &self.apache_result,
            &self.apache_vars,
            &self.labs,
            &self.vitals,
        ]
    }
}

/// Resolved paths of the five source tables, all known to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFiles {
    pub patient: PathBuf,
    pub apache_result: PathBuf,
    pub apache_vars: PathBuf,
    pub labs: PathBuf,
    pub vitals: PathBuf,
}

/// Resolves every source file inside `dir`.
///
/// All absent files are collected into a single
/// [`IngestError::MissingFiles`] so the caller can report them together.
pub fn locate_source_files(dir: &Path, names: &SourceFileNames) -> Result<SourceFiles> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let missing: Vec<String> = names
        .in_order()
        .iter()
        .filter(|name| !dir.join(name).is_file())
        .map(|name| (*name).to_string())
        .collect();

    if !missing.is_empty() {
        tracing::error!(
            dir = %dir.display(),
            missing = ?missing,
            "required source files are missing"
        );
        return Err(IngestError::MissingFiles {
            dir: dir.to_path_buf(),
            missing,
        });
    }

    Ok(SourceFiles {
        patient: dir.join(&names.patient),
        apache_result: dir.join(&names.apache_result),
        apache_vars: dir.join(&names.apache_vars),
        labs: dir.join(&names.labs),
        vitals: dir.join(&names.vitals),
    })
}
