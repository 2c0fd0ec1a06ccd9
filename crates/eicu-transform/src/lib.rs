//! eICU patient table construction.
//!
//! This crate turns the five eICU source tables into one denormalized
//! row-per-stay DataFrame:
//!
//! - **join**: key deduplication and order-preserving left joins
//! - **labs**: lab event counts and critical lab flags
//! - **vitals**: per-stay mean/max for vital sign channels
//! - **outcome**: the `expired` mortality flag
//! - **builder**: orchestration and the [`BuildReport`]
//!
//! Lab and vitals blocks are optional enrichments. They come back as
//! [`Enrichment::Skipped`] instead of failing the build.

pub mod builder;
pub mod data_utils;
pub mod enrichment;
pub mod error;
pub mod join;
pub mod labs;
pub mod options;
pub mod outcome;
pub mod vitals;

pub use builder::{
    BuildReport, BuiltTable, DedupeRecord, SourceTable, build_patient_table, merge_core_tables,
};
pub use enrichment::{Enrichment, EnrichmentRecord, EnrichmentStatus, SkipReason};
pub use error::{BuildError, Result};
pub use options::BuildOptions;
