//! Lab event aggregation: per-stay counts and critical lab flags.

use std::path::Path;

use eicu_ingest::read_csv_table;
use polars::prelude::{
    DataFrame, DataType, IntoLazy, NamedFrom, PolarsResult, Series, SortMultipleOptions,
    UniqueKeepStrategy, col, len, lit,
};

use crate::enrichment::{Enrichment, SkipReason};
use crate::join::left_join_on_key;
use crate::options::BuildOptions;

/// Column holding the number of lab events per stay.
pub const LAB_COUNT_COLUMN: &str = "lab_count";

/// Stays that recorded at least one lab whose name contains `lab`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabFlag {
    pub lab: String,
    /// Sorted, distinct stay identifiers as `Int64`.
    pub stays: Series,
}

/// Aggregated lab features keyed by stay identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct LabFeatures {
    /// One row per stay with labs: the key and [`LAB_COUNT_COLUMN`], sorted by key.
    pub counts: DataFrame,
    pub flags: Vec<LabFlag>,
}

impl LabFeatures {
    /// Adds `lab_count` and one `has_<lab>` column per flag to `df`.
    ///
    /// Stays without lab events get a count of zero and `false` flags.
    /// Returns the names of the columns added.
    pub fn apply(&self, df: &mut DataFrame, key: &str) -> PolarsResult<Vec<String>> {
        let joined = left_join_on_key(df, &self.counts, key)?;

        let mut exprs = vec![col(LAB_COUNT_COLUMN).fill_null(lit(0i64))];
        let mut added = vec![LAB_COUNT_COLUMN.to_string()];
        for flag in &self.flags {
            let name = BuildOptions::lab_flag_column(&flag.lab);
            exprs.push(
                col(key)
                    .cast(DataType::Int64)
                    .is_in(lit(flag.stays.clone()).implode(), false)
                    .fill_null(lit(false))
                    .alias(name.as_str()),
            );
            added.push(name);
        }
        *df = joined.lazy().with_columns(exprs).collect()?;
        Ok(added)
    }
}

/// Adds a zero `lab_count` column, used when lab enrichment is skipped.
pub fn apply_default_lab_count(df: &mut DataFrame) -> PolarsResult<Vec<String>> {
    let zeros = vec![0i64; df.height()];
    df.with_column(Series::new(LAB_COUNT_COLUMN.into(), zeros))?;
    Ok(vec![LAB_COUNT_COLUMN.to_string()])
}

/// Reads the lab table at `path` and summarizes it.
pub fn load_lab_features(path: &Path, options: &BuildOptions) -> Enrichment<LabFeatures> {
    match read_csv_table(path) {
        Ok(labs) => summarize_labs(&labs, options),
        Err(err) => Enrichment::Skipped(SkipReason::ReadFailed {
            path: path.to_path_buf(),
            message: err.to_string(),
        }),
    }
}

/// Counts lab events per stay and collects the stays for each lab flag.
///
/// Flag matching is a case-insensitive substring test on the lab name.
/// Events whose key is null or not an integer are ignored.
pub fn summarize_labs(labs: &DataFrame, options: &BuildOptions) -> Enrichment<LabFeatures> {
    if labs.height() == 0 {
        return Enrichment::Skipped(SkipReason::Empty);
    }
    for column in [&options.key_column, &options.lab_name_column] {
        if labs.column(column).is_err() {
            return Enrichment::Skipped(SkipReason::MissingColumn {
                column: column.clone(),
            });
        }
    }

    match aggregate_labs(labs, options) {
        Ok(features) => {
            tracing::debug!(
                stays = features.counts.height(),
                events = labs.height(),
                "summarized lab events"
            );
            Enrichment::Enriched(features)
        }
        Err(err) => Enrichment::Skipped(SkipReason::AggregateFailed {
            message: err.to_string(),
        }),
    }
}

fn aggregate_labs(labs: &DataFrame, options: &BuildOptions) -> PolarsResult<LabFeatures> {
    let key = options.key_column.as_str();
    let events = labs
        .clone()
        .lazy()
        .with_column(col(key).cast(DataType::Int64))
        .filter(col(key).is_not_null());

    let counts = events
        .clone()
        .group_by([col(key)])
        .agg([len().cast(DataType::Int64).alias(LAB_COUNT_COLUMN)])
        .sort([key], SortMultipleOptions::default())
        .collect()?;

    let names = col(options.lab_name_column.as_str())
        .cast(DataType::String)
        .str()
        .to_lowercase();
    let flags = options
        .lab_flags
        .iter()
        .map(|lab| {
            let matched = events
                .clone()
                .filter(names.clone().str().contains_literal(lit(lab.to_lowercase())))
                .select([col(key)])
                .unique(None, UniqueKeepStrategy::Any)
                .sort([key], SortMultipleOptions::default())
                .collect()?;
            Ok(LabFlag {
                lab: lab.clone(),
                stays: matched.column(key)?.as_materialized_series().clone(),
            })
        })
        .collect::<PolarsResult<Vec<_>>>()?;

    Ok(LabFeatures { counts, flags })
}
