//! Query layer over the merged eICU patient table.
//!
//! A [`QueryTable`] answers the three questions the serving layer asks:
//! what the schema is, what the first rows look like, and which rows match a
//! single-column filter.
//!
//! Filters arrive untyped: a column name, an operator token and a JSON value.
//! The value is coerced to the column's [`ColumnType`] before evaluation, so
//! `"141296"` and `141296` select the same rows of an integer column.

pub mod coerce;
pub mod error;
pub mod evaluate;
pub mod operator;
pub mod render;
pub mod table;
pub mod types;

pub use error::FilterError;
pub use operator::{FilterOperator, SUPPORTED_OPERATORS};
pub use table::{ColumnSchema, QueryTable, TableSchema};
pub use types::{ColumnType, ScalarValue};
