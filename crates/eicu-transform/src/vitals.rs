//! Vital sign aggregation: per-stay mean and max for each channel.

use std::path::Path;

use eicu_ingest::read_csv_table;
use polars::prelude::{
    Column, DataFrame, DataType, Expr, IntoLazy, PolarsResult, RoundMode, SortMultipleOptions,
    col,
};

use crate::enrichment::{Enrichment, SkipReason};
use crate::join::left_join_on_key;
use crate::options::BuildOptions;

pub fn mean_column(channel: &str) -> String {
    format!("{channel}_mean")
}

pub fn max_column(channel: &str) -> String {
    format!("{channel}_max")
}

/// Aggregated vital sign features for every usable channel.
#[derive(Debug, Clone, PartialEq)]
pub struct VitalFeatures {
    pub channels: Vec<String>,
    /// One row per stay with samples, sorted by key: the key plus
    /// `<channel>_mean` and `<channel>_max` for each channel.
    pub stats: DataFrame,
}

impl VitalFeatures {
    /// Names of the stat columns in channel order.
    pub fn stat_columns(&self) -> Vec<String> {
        self.channels
            .iter()
            .flat_map(|channel| [mean_column(channel), max_column(channel)])
            .collect()
    }

    /// Left-joins the per-stay stats onto `df`.
    ///
    /// Stays without samples get nulls. Returns the names of the columns added.
    pub fn apply(&self, df: &mut DataFrame, key: &str) -> PolarsResult<Vec<String>> {
        *df = left_join_on_key(df, &self.stats, key)?;
        Ok(self.stat_columns())
    }
}

/// Reads the vitals table at `path` and summarizes it.
pub fn load_vital_features(path: &Path, options: &BuildOptions) -> Enrichment<VitalFeatures> {
    match read_csv_table(path) {
        Ok(vitals) => summarize_vitals(&vitals, options),
        Err(err) => Enrichment::Skipped(SkipReason::ReadFailed {
            path: path.to_path_buf(),
            message: err.to_string(),
        }),
    }
}

/// Computes per-stay mean (2 decimals) and max for each configured channel.
///
/// Max keeps the channel's dtype. Absent channels are ignored. A channel that
/// is present but neither numeric nor fully parseable as numbers is skipped
/// with a warning.
pub fn summarize_vitals(vitals: &DataFrame, options: &BuildOptions) -> Enrichment<VitalFeatures> {
    if vitals.height() == 0 {
        return Enrichment::Skipped(SkipReason::Empty);
    }
    let key = options.key_column.as_str();
    if vitals.column(key).is_err() {
        return Enrichment::Skipped(SkipReason::MissingColumn {
            column: options.key_column.clone(),
        });
    }

    let mut present = 0usize;
    let mut channels = Vec::new();
    let mut aggs = Vec::new();
    for channel in &options.vital_channels {
        let Ok(column) = vitals.column(channel) else {
            tracing::debug!(channel = %channel, "vital channel not present");
            continue;
        };
        present += 1;
        let Some(values) = channel_values(channel, column) else {
            tracing::warn!(
                channel = %channel,
                dtype = %column.dtype(),
                "vital channel is not numeric, skipping"
            );
            continue;
        };
        aggs.push(
            values
                .clone()
                .mean()
                .round(2, RoundMode::HalfAwayFromZero)
                .alias(mean_column(channel)),
        );
        aggs.push(values.max().alias(max_column(channel)));
        channels.push(channel.clone());
    }

    if present == 0 {
        return Enrichment::Skipped(SkipReason::NoVitalChannels);
    }
    if channels.is_empty() {
        return Enrichment::Skipped(SkipReason::NoUsableChannels);
    }

    let stats = vitals
        .clone()
        .lazy()
        .with_column(col(key).cast(DataType::Int64))
        .filter(col(key).is_not_null())
        .group_by([col(key)])
        .agg(aggs)
        .sort([key], SortMultipleOptions::default())
        .collect();
    match stats {
        Ok(stats) => {
            tracing::debug!(
                channels = channels.len(),
                stays = stats.height(),
                samples = vitals.height(),
                "summarized vital signs"
            );
            Enrichment::Enriched(VitalFeatures { channels, stats })
        }
        Err(err) => Enrichment::Skipped(SkipReason::AggregateFailed {
            message: err.to_string(),
        }),
    }
}

/// The expression to aggregate for a channel, or `None` when it cannot be
/// read as numbers. Text channels are parsed as `Float64`.
fn channel_values(channel: &str, column: &Column) -> Option<Expr> {
    match column.dtype() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64 => Some(col(channel)),
        DataType::String | DataType::Null => column
            .strict_cast(&DataType::Float64)
            .ok()
            .map(|_| col(channel).cast(DataType::Float64)),
        _ => None,
    }
}
