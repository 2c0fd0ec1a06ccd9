//! eICU data ingestion utilities.
//!
//! This crate locates the eICU source tables in a data directory and loads
//! them into Polars DataFrames.
//!
//! # Features
//!
//! - **Discovery**: Resolve the five source files and report every missing one
//! - **CSV Loading**: Read tables with full-file schema inference
//! - **CSV Writing**: Persist the merged patient table for the serving stage
//! - **Value Helpers**: Convert Polars `AnyValue`s into plain Rust values
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use eicu_ingest::{SourceFileNames, locate_source_files, read_csv_table};
//!
//! let files = locate_source_files(Path::new("eicu_demo_data"), &SourceFileNames::default())?;
//! let patients = read_csv_table(&files.patient)?;
//! ```

mod csv;
mod discovery;
mod error;
mod polars_utils;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading / Writing ===
pub use self::csv::{read_csv_headers, read_csv_table, require_column, write_csv_table};

// === File Discovery ===
pub use discovery::{SourceFileNames, SourceFiles, locate_source_files};

// === Value Helpers ===
pub use polars_utils::{
    any_to_f64, any_to_i64, any_to_string, format_numeric, parse_f64, parse_i64,
};
