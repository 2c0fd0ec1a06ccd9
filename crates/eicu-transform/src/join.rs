//! Key deduplication and left joins on the stay identifier.

use std::collections::BTreeSet;

use polars::prelude::{
    BooleanChunked, DataFrame, IntoLazy, JoinArgs, JoinType, MaintainOrderJoin, NewChunkedArray,
    PolarsResult, col,
};

use crate::data_utils::key_values;

/// Keeps the first row for every key and drops the rest.
///
/// Rows whose key is null or not an integer are kept. They can never match a
/// join partner, so they cannot fan out a join.
///
/// Returns the number of rows removed.
pub fn dedupe_by_key(df: &mut DataFrame, key: &str) -> PolarsResult<usize> {
    if df.height() == 0 {
        return Ok(0);
    }
    let keys = key_values(df, key)?;
    let mut seen = BTreeSet::new();
    let keep: Vec<bool> = keys
        .iter()
        .map(|value| match value {
            Some(k) => seen.insert(*k),
            None => true,
        })
        .collect();
    let removed = keep.iter().filter(|kept| !**kept).count();
    if removed > 0 {
        let mask = BooleanChunked::from_slice("dedupe".into(), &keep);
        *df = df.filter(&mask)?;
    }
    Ok(removed)
}

/// Left-joins `right` onto `left` on `key`.
///
/// Left row order is preserved and unmatched rows get nulls. Null keys never
/// match. The right key is cast to the left key's dtype before joining. A
/// right column whose name already exists in `left` gets a `_right` suffix.
///
/// Every right key must be unique, otherwise matching left rows fan out;
/// run [`dedupe_by_key`] on `right` first.
pub fn left_join_on_key(left: &DataFrame, right: &DataFrame, key: &str) -> PolarsResult<DataFrame> {
    let key_dtype = left.column(key)?.dtype().clone();
    let right = right
        .clone()
        .lazy()
        .with_column(col(key).cast(key_dtype));
    let args = JoinArgs {
        maintain_order: MaintainOrderJoin::Left,
        ..JoinArgs::new(JoinType::Left)
    };
    left.clone()
        .lazy()
        .join(right, [col(key)], [col(key)], args)
        .collect()
}
