//! Row masks for each operator family.
//!
//! Every mask has one entry per row and null cells are always `false`.

use std::cmp::Ordering;

use eicu_ingest::{any_to_f64, any_to_i64, any_to_string};
use polars::prelude::{AnyValue, BooleanChunked, Column, NewChunkedArray, PolarsResult};
use serde_json::Value;

use crate::operator::FilterOperator;
use crate::render::any_to_json;
use crate::types::{ColumnType, ScalarValue};

const MASK_NAME: &str = "filter_mask";

fn build_mask(
    column: &Column,
    mut keep: impl FnMut(AnyValue<'_>) -> bool,
) -> PolarsResult<BooleanChunked> {
    let mut mask = Vec::with_capacity(column.len());
    for idx in 0..column.len() {
        let cell = column.get(idx)?;
        mask.push(!cell.is_null() && keep(cell));
    }
    Ok(BooleanChunked::from_slice(MASK_NAME.into(), &mask))
}

/// Reads a cell as the column's declared type.
pub fn cell_value(cell: AnyValue<'_>, column_type: ColumnType) -> Option<ScalarValue> {
    if cell.is_null() {
        return None;
    }
    match column_type {
        ColumnType::Integer => any_to_i64(cell).map(ScalarValue::Integer),
        ColumnType::Float => any_to_f64(cell).map(ScalarValue::Float),
        ColumnType::Boolean => match cell {
            AnyValue::Boolean(b) => Some(ScalarValue::Boolean(b)),
            _ => None,
        },
        ColumnType::Text => Some(ScalarValue::Text(any_to_string(cell))),
    }
}

fn ordering_satisfies(operator: FilterOperator, ordering: Ordering) -> bool {
    match operator {
        FilterOperator::Eq => ordering == Ordering::Equal,
        FilterOperator::Ne => ordering != Ordering::Equal,
        FilterOperator::Gt => ordering == Ordering::Greater,
        FilterOperator::Lt => ordering == Ordering::Less,
        FilterOperator::Ge => ordering != Ordering::Less,
        FilterOperator::Le => ordering != Ordering::Greater,
        FilterOperator::Contains | FilterOperator::In => false,
    }
}

/// `==`, `!=`, `>`, `<`, `>=`, `<=` against an already coerced value.
pub fn comparison_mask(
    column: &Column,
    column_type: ColumnType,
    operator: FilterOperator,
    target: &ScalarValue,
) -> PolarsResult<BooleanChunked> {
    build_mask(column, |cell| {
        cell_value(cell, column_type)
            .and_then(|value| value.compare(target))
            .is_some_and(|ordering| ordering_satisfies(operator, ordering))
    })
}

/// Case-sensitive substring test on the text form of each cell.
pub fn contains_mask(column: &Column, needle: &str) -> PolarsResult<BooleanChunked> {
    build_mask(column, |cell| any_to_string(cell).contains(needle))
}

/// Membership in `items`. Numbers compare numerically, everything else by
/// JSON equality. NaN cells never match.
pub fn membership_mask(column: &Column, items: &[Value]) -> PolarsResult<BooleanChunked> {
    build_mask(column, |cell| {
        if is_nan(&cell) {
            return false;
        }
        let cell = any_to_json(cell);
        items.iter().any(|item| json_matches(&cell, item))
    })
}

fn is_nan(cell: &AnyValue<'_>) -> bool {
    match cell {
        AnyValue::Float32(f) => f.is_nan(),
        AnyValue::Float64(f) => f.is_nan(),
        _ => false,
    }
}

fn json_matches(cell: &Value, item: &Value) -> bool {
    match (cell, item) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => cell == item,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn mask_values(mask: &BooleanChunked) -> Vec<bool> {
        mask.into_iter().map(|v| v.unwrap_or(false)).collect()
    }

    #[test]
    fn null_cells_never_match() {
        let column = Column::new("age".into(), [Some(70i64), None, Some(45)]);
        let mask = comparison_mask(
            &column,
            ColumnType::Integer,
            FilterOperator::Ne,
            &ScalarValue::Integer(45),
        )
        .unwrap();
        assert_eq!(mask_values(&mask), [true, false, false]);
    }

    #[test]
    fn inclusive_bounds() {
        let column = Column::new("temperature_max".into(), [36.5f64, 38.0, 39.2]);
        let target = ScalarValue::Float(38.0);
        let ge = comparison_mask(&column, ColumnType::Float, FilterOperator::Ge, &target).unwrap();
        let lt = comparison_mask(&column, ColumnType::Float, FilterOperator::Lt, &target).unwrap();
        assert_eq!(mask_values(&ge), [false, true, true]);
        assert_eq!(mask_values(&lt), [true, false, false]);
    }

    #[test]
    fn membership_compares_numbers_numerically() {
        let column = Column::new("lab_count".into(), [0i64, 2, 5]);
        let mask = membership_mask(&column, &[json!(2.0), json!("5")]).unwrap();
        assert_eq!(mask_values(&mask), [false, true, false]);
    }

    #[test]
    fn membership_skips_nan_cells() {
        let column = Column::new("heartrate_mean".into(), [Some(80.0f64), Some(f64::NAN), None]);
        let nulls = membership_mask(&column, &[Value::Null]).unwrap();
        assert_eq!(mask_values(&nulls), [false, false, false]);
        let numbers = membership_mask(&column, &[json!(80)]).unwrap();
        assert_eq!(mask_values(&numbers), [true, false, false]);
    }

    #[test]
    fn contains_reads_cells_as_text() {
        let column = Column::new("unitdischargestatus".into(), [Some("Expired"), Some("Alive"), None]);
        let mask = contains_mask(&column, "xpir").unwrap();
        assert_eq!(mask_values(&mask), [true, false, false]);
    }
}
