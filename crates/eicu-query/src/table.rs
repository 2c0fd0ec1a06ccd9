//! The queryable table and its operations.

use std::path::Path;

use eicu_ingest::read_csv_table;
use polars::prelude::{Column, DataFrame};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::coerce::{coerce, coerce_text};
use crate::error::{FilterError, Result};
use crate::evaluate::{comparison_mask, contains_mask, membership_mask};
use crate::operator::FilterOperator;
use crate::render::rows_to_json;
use crate::types::ColumnType;

/// Column names, dtypes and row count of a loaded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub row_count: usize,
    pub columns: Vec<ColumnSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    pub name: String,
    /// Polars dtype as displayed by polars (`i64`, `f64`, `str`, ...).
    pub dtype: String,
    pub column_type: ColumnType,
}

/// An immutable, loaded patient table.
#[derive(Debug, Clone)]
pub struct QueryTable {
    data: DataFrame,
}

impl QueryTable {
    pub fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// Loads a merged table written by the builder.
    pub fn from_csv(path: &Path) -> eicu_ingest::Result<Self> {
        let data = read_csv_table(path)?;
        info!(
            path = %path.display(),
            rows = data.height(),
            columns = data.width(),
            "loaded query table"
        );
        Ok(Self::new(data))
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    fn column(&self, name: &str) -> Result<&Column> {
        self.data
            .column(name)
            .map_err(|_| FilterError::ColumnNotFound {
                column: name.to_string(),
                available: self.column_names(),
            })
    }

    pub fn column_type(&self, name: &str) -> Result<ColumnType> {
        self.column(name)
            .map(|column| ColumnType::from_dtype(column.dtype()))
    }

    pub fn schema(&self) -> TableSchema {
        TableSchema {
            row_count: self.data.height(),
            columns: self
                .data
                .get_columns()
                .iter()
                .map(|column| ColumnSchema {
                    name: column.name().to_string(),
                    dtype: column.dtype().to_string(),
                    column_type: ColumnType::from_dtype(column.dtype()),
                })
                .collect(),
        }
    }

    pub fn schema_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.schema())?)
    }

    /// First `n` rows, fewer if the table is shorter.
    pub fn head(&self, n: usize) -> DataFrame {
        self.data.head(Some(n))
    }

    pub fn head_json(&self, n: usize) -> Result<String> {
        Ok(serde_json::to_string(&rows_to_json(&self.head(n))?)?)
    }

    /// Returns the rows where `column operator value` holds, in table order.
    ///
    /// The column is checked before the operator, and the operator before
    /// the value is coerced.
    pub fn filter(&self, column: &str, operator: &str, value: &Value) -> Result<DataFrame> {
        let series = self.column(column)?;
        let operator: FilterOperator = operator.parse()?;
        let column_type = ColumnType::from_dtype(series.dtype());

        let mask = match operator {
            FilterOperator::Contains => {
                let needle = coerce_text(value);
                debug!(column, %column_type, "contains compares cells as text");
                contains_mask(series, &needle)?
            }
            FilterOperator::In => {
                let Value::Array(items) = value else {
                    return Err(FilterError::InRequiresList {
                        column: column.to_string(),
                        value: value.to_string(),
                    });
                };
                debug!(column, items = items.len(), "membership elements used as given");
                membership_mask(series, items)?
            }
            _ => {
                let target = coerce(column, value, column_type)?;
                comparison_mask(series, column_type, operator, &target)?
            }
        };

        let matched = self.data.filter(&mask)?;
        debug!(
            column,
            operator = %operator,
            matched = matched.height(),
            total = self.data.height(),
            "filter evaluated"
        );
        Ok(matched)
    }

    /// [`filter`](Self::filter), serialized as a JSON array of row objects.
    pub fn filter_rows_json(&self, column: &str, operator: &str, value: &Value) -> Result<String> {
        let matched = self.filter(column, operator, value)?;
        Ok(serde_json::to_string(&rows_to_json(&matched)?)?)
    }
}
