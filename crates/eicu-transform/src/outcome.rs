//! Mortality flag derived from the free-text ICU outcome.

use eicu_ingest::any_to_string;
use polars::prelude::{AnyValue, DataFrame, NamedFrom, PolarsResult, Series};

use crate::options::BuildOptions;

/// Column holding the derived mortality flag.
pub const EXPIRED_COLUMN: &str = "expired";

/// True when `outcome` contains `marker`, ignoring case. Missing outcomes are false.
pub fn is_expired(outcome: Option<&str>, marker: &str) -> bool {
    outcome.is_some_and(|text| text.to_lowercase().contains(&marker.to_lowercase()))
}

/// Adds the `expired` column to `df`.
///
/// When the outcome column is absent every row is `false`. Returns whether
/// the outcome column was found.
pub fn derive_expired(df: &mut DataFrame, options: &BuildOptions) -> PolarsResult<bool> {
    let marker = options.expired_marker.as_str();
    let (present, flags) = match df.column(&options.outcome_column) {
        Ok(column) => {
            let flags: Vec<bool> = (0..df.height())
                .map(|idx| match column.get(idx) {
                    Ok(AnyValue::Null) | Err(_) => false,
                    Ok(value) => is_expired(Some(&any_to_string(value)), marker),
                })
                .collect();
            (true, flags)
        }
        Err(_) => {
            tracing::warn!(
                column = %options.outcome_column,
                "outcome column not found, expired defaults to false"
            );
            (false, vec![false; df.height()])
        }
    };
    df.with_column(Series::new(EXPIRED_COLUMN.into(), flags))?;
    Ok(present)
}
