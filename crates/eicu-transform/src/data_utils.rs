//! DataFrame value extraction helpers.

use eicu_ingest::any_to_i64;
use polars::prelude::{AnyValue, DataFrame, PolarsResult};

/// Reads the stay identifier of every row. Nulls and unparsable keys are `None`.
pub fn key_values(df: &DataFrame, key: &str) -> PolarsResult<Vec<Option<i64>>> {
    let column = df.column(key)?;
    Ok((0..df.height())
        .map(|idx| any_to_i64(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect())
}
