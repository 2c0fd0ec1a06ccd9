//! Build configuration.

use eicu_ingest::SourceFileNames;
use serde::{Deserialize, Serialize};

/// Options controlling how the patient table is assembled.
///
/// Every field has an eICU default, so a partial TOML table is enough to
/// override one setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Source file names inside the data directory.
    pub files: SourceFileNames,
    /// Stay identifier shared by every source table.
    pub key_column: String,
    /// Lab test name column in the lab table.
    pub lab_name_column: String,
    /// Lab name substrings that get a `has_<lab>` flag.
    pub lab_flags: Vec<String>,
    /// Vital sign channels summarized as `<channel>_mean` / `<channel>_max`.
    pub vital_channels: Vec<String>,
    /// Free-text outcome column used for the `expired` flag.
    pub outcome_column: String,
    /// Case-insensitive marker that flags an outcome as expired.
    pub expired_marker: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            files: SourceFileNames::default(),
            key_column: "patientunitstayid".to_string(),
            lab_name_column: "labname".to_string(),
            lab_flags: ["wbc", "creatinine", "lactate", "bilirubin", "glucose"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            vital_channels: ["heartrate", "systemicsystolic", "temperature"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            outcome_column: "actualicumortality".to_string(),
            expired_marker: "expired".to_string(),
        }
    }
}

impl BuildOptions {
    /// Column name of the flag derived for `lab`.
    pub fn lab_flag_column(lab: &str) -> String {
        format!("has_{lab}")
    }
}
