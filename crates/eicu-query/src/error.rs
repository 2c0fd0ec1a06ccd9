//! Error types for filter evaluation.
//!
//! The `Display` text of every variant is the message a client sees, so the
//! wording is part of the contract.

use polars::prelude::PolarsError;
use thiserror::Error;

use crate::operator::SUPPORTED_OPERATORS;
use crate::types::ColumnType;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("No data loaded")]
    NotLoaded,

    #[error("Column '{column}' not found. Available columns: {}", available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("Unsupported operator '{operator}'. Supported operators: {}", SUPPORTED_OPERATORS.join(", "))]
    UnsupportedOperator { operator: String },

    #[error("Cannot convert value {value} to {expected} for column '{column}'")]
    Coercion {
        column: String,
        /// JSON text of the raw value.
        value: String,
        expected: ColumnType,
    },

    #[error("Operator 'in' requires a list value for column '{column}', got {value}")]
    InRequiresList { column: String, value: String },

    #[error("DataFrame operation failed: {0}")]
    DataFrame(#[from] PolarsError),

    #[error("Failed to serialize rows: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;
