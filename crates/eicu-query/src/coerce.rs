//! Coercion of raw JSON filter values to a column's declared type.
//!
//! One function per [`ColumnType`]; each returns `None` when the value cannot
//! be represented, and [`coerce`] turns that into [`FilterError::Coercion`].

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{FilterError, Result};
use crate::types::{ColumnType, ScalarValue};

/// Coerces `raw` to `column_type` for a filter on `column`.
pub fn coerce(column: &str, raw: &Value, column_type: ColumnType) -> Result<ScalarValue> {
    let coerced = match column_type {
        ColumnType::Integer => coerce_integer(raw).map(ScalarValue::Integer),
        ColumnType::Float => coerce_float(raw).map(ScalarValue::Float),
        ColumnType::Boolean => Some(ScalarValue::Boolean(coerce_boolean(raw))),
        ColumnType::Text => Some(ScalarValue::Text(coerce_text(raw))),
    };

    match coerced {
        Some(value) => {
            debug!(column, %column_type, kind = json_kind(raw), "coerced filter value");
            trace!(column, raw = %raw, coerced = ?value, "coercion detail");
            Ok(value)
        }
        None => {
            debug!(column, %column_type, kind = json_kind(raw), "filter value coercion failed");
            Err(FilterError::Coercion {
                column: column.to_string(),
                value: raw.to_string(),
                expected: column_type,
            })
        }
    }
}

/// 2^63, the first float past `i64::MAX`.
const I64_FLOAT_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Integral numbers pass through, floats truncate toward zero, strings are
/// parsed after trimming and booleans map to 1/0. Values outside the `i64`
/// range are rejected.
pub fn coerce_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(f64::trunc)
                .filter(|f| (-I64_FLOAT_BOUND..I64_FLOAT_BOUND).contains(f))
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

pub fn coerce_float(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Strings are true only for `true`, `1` or `yes`; anything else falls back
/// to truthiness.
pub fn coerce_boolean(raw: &Value) -> bool {
    match raw {
        Value::Bool(b) => *b,
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1" || s.eq_ignore_ascii_case("yes")
        }
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Null => false,
    }
}

/// Strings are used as given. Booleans render as `True` / `False`, other
/// values as their JSON text.
pub fn coerce_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

fn json_kind(raw: &Value) -> &'static str {
    match raw {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
