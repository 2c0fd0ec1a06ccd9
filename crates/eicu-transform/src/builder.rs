//! Patient table orchestration.
//!
//! Stages, in order:
//!
//! 1. Locate the five source files (all must exist)
//! 2. Load the patient and both APACHE tables, deduplicating each by stay
//! 3. Left-join the APACHE tables onto the patient table
//! 4. Lab enrichment (`lab_count`, `has_<lab>`), defaulting `lab_count` to 0
//! 5. Vitals enrichment (`<channel>_mean`, `<channel>_max`), omitted on skip
//! 6. Derive `expired` from the outcome text

use std::path::Path;

use eicu_ingest::{locate_source_files, read_csv_table, require_column};
use polars::prelude::DataFrame;
use tracing::{info, info_span, warn};

use crate::enrichment::{Enrichment, EnrichmentRecord, SkipReason};
use crate::error::Result;
use crate::join::{dedupe_by_key, left_join_on_key};
use crate::labs::{apply_default_lab_count, load_lab_features};
use crate::options::BuildOptions;
use crate::outcome::derive_expired;
use crate::vitals::load_vital_features;

/// Duplicate rows dropped from one source before joining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupeRecord {
    pub source: String,
    pub removed: usize,
}

/// What the build did, for summaries and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub rows: usize,
    pub columns: usize,
    pub deduplicated: Vec<DedupeRecord>,
    pub enrichments: Vec<EnrichmentRecord>,
    pub outcome_column_present: bool,
}

impl BuildReport {
    /// Looks up an enrichment record by name (`"labs"` or `"vitals"`).
    pub fn enrichment(&self, name: &str) -> Option<&EnrichmentRecord> {
        self.enrichments.iter().find(|record| record.name == name)
    }

    /// Total duplicate rows dropped across all sources.
    pub fn duplicates_removed(&self) -> usize {
        self.deduplicated.iter().map(|record| record.removed).sum()
    }
}

/// The merged patient table together with its build report.
#[derive(Debug, Clone)]
pub struct BuiltTable {
    pub data: DataFrame,
    pub report: BuildReport,
}

/// Builds the merged row-per-stay table from the files in `data_dir`.
///
/// # Errors
///
/// Fails when a source file is missing, or when a core table (patient or
/// APACHE) cannot be read or lacks the key column. Lab and vitals problems
/// never fail the build; they are recorded in [`BuildReport::enrichments`].
pub fn build_patient_table(data_dir: &Path, options: &BuildOptions) -> Result<BuiltTable> {
    let span = info_span!("build", data_dir = %data_dir.display());
    let _guard = span.enter();

    let files = locate_source_files(data_dir, &options.files)?;

    let patient = read_keyed_table(&files.patient, &options.key_column)?;
    let apache_result = read_keyed_table(&files.apache_result, &options.key_column)?;
    let apache_vars = read_keyed_table(&files.apache_vars, &options.key_column)?;

    let (mut merged, deduplicated) = merge_core_tables(
        SourceTable::new(&options.files.patient, patient),
        vec![
            SourceTable::new(&options.files.apache_result, apache_result),
            SourceTable::new(&options.files.apache_vars, apache_vars),
        ],
        &options.key_column,
    )?;

    let mut enrichments = Vec::with_capacity(2);

    let labs = load_lab_features(&files.labs, options);
    let lab_record = match &labs {
        Enrichment::Enriched(features) => {
            let snapshot = merged.clone();
            match features.apply(&mut merged, &options.key_column) {
                Ok(columns) => EnrichmentRecord::applied("labs", columns),
                Err(err) => {
                    let reason = SkipReason::ApplyFailed {
                        message: err.to_string(),
                    };
                    merged = snapshot;
                    apply_default_lab_count(&mut merged)?;
                    EnrichmentRecord::skipped("labs", reason)
                }
            }
        }
        Enrichment::Skipped(reason) => {
            apply_default_lab_count(&mut merged)?;
            EnrichmentRecord::skipped("labs", reason.clone())
        }
    };
    enrichments.push(lab_record);

    let vitals = load_vital_features(&files.vitals, options);
    let vitals_record = match &vitals {
        Enrichment::Enriched(features) => {
            let snapshot = merged.clone();
            match features.apply(&mut merged, &options.key_column) {
                Ok(columns) => EnrichmentRecord::applied("vitals", columns),
                Err(err) => {
                    merged = snapshot;
                    EnrichmentRecord::skipped(
                        "vitals",
                        SkipReason::ApplyFailed {
                            message: err.to_string(),
                        },
                    )
                }
            }
        }
        Enrichment::Skipped(reason) => EnrichmentRecord::skipped("vitals", reason.clone()),
    };
    enrichments.push(vitals_record);

    let outcome_column_present = derive_expired(&mut merged, options)?;

    let report = BuildReport {
        rows: merged.height(),
        columns: merged.width(),
        deduplicated,
        enrichments,
        outcome_column_present,
    };
    info!(
        rows = report.rows,
        columns = report.columns,
        duplicates_removed = report.duplicates_removed(),
        "built patient table"
    );
    Ok(BuiltTable {
        data: merged,
        report,
    })
}

fn read_keyed_table(path: &Path, key: &str) -> Result<DataFrame> {
    let df = read_csv_table(path)?;
    require_column(&df, key, path)?;
    Ok(df)
}

/// A loaded source table and the file name it came from.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub name: String,
    pub data: DataFrame,
}

impl SourceTable {
    pub fn new(name: impl Into<String>, data: DataFrame) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Deduplicates the base table and each severity source by `key`, then
/// left-joins the sources onto the base in order.
///
/// The result has exactly one row per distinct key of `base`. One
/// [`DedupeRecord`] is returned per table, base first.
pub fn merge_core_tables(
    base: SourceTable,
    severity: Vec<SourceTable>,
    key: &str,
) -> Result<(DataFrame, Vec<DedupeRecord>)> {
    let mut records = Vec::with_capacity(severity.len() + 1);

    let SourceTable {
        name,
        data: mut merged,
    } = base;
    let removed = dedupe_by_key(&mut merged, key)?;
    if removed > 0 {
        warn!(source = %name, removed, "base table has duplicate stay identifiers");
    }
    records.push(DedupeRecord {
        source: name,
        removed,
    });

    for SourceTable { name, mut data } in severity {
        let removed = dedupe_by_key(&mut data, key)?;
        if removed > 0 {
            info!(source = %name, removed, "dropped duplicate severity-score rows");
        }
        merged = left_join_on_key(&merged, &data, key)?;
        records.push(DedupeRecord {
            source: name,
            removed,
        });
    }
    Ok((merged, records))
}
