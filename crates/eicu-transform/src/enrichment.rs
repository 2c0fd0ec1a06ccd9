//! Optional feature blocks layered onto the merged table.

use std::path::PathBuf;

use thiserror::Error;

/// Outcome of computing an optional feature block.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment<T> {
    /// The block was computed and can be applied.
    Enriched(T),
    /// The block was skipped; the build carries on without it.
    Skipped(SkipReason),
}

impl<T> Enrichment<T> {
    /// Borrow the computed features, if any.
    pub fn features(&self) -> Option<&T> {
        match self {
            Self::Enriched(features) => Some(features),
            Self::Skipped(_) => None,
        }
    }
}

/// Why an enrichment was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("failed to read {}: {message}", path.display())]
    ReadFailed { path: PathBuf, message: String },

    #[error("column '{column}' not found")]
    MissingColumn { column: String },

    #[error("source table has no rows")]
    Empty,

    #[error("none of the configured vital channels are present")]
    NoVitalChannels,

    #[error("no vital channel is numeric or coercible to numeric")]
    NoUsableChannels,

    #[error("failed to aggregate: {message}")]
    AggregateFailed { message: String },

    #[error("failed to attach columns: {message}")]
    ApplyFailed { message: String },
}

impl SkipReason {
    /// Skips that are part of normal operation and need no warning.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::Empty | Self::NoVitalChannels)
    }
}

/// Report entry for a single enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentStatus {
    Applied { columns: Vec<String> },
    Skipped { reason: SkipReason },
}

/// Named enrichment outcome recorded in the build report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRecord {
    pub name: &'static str,
    pub status: EnrichmentStatus,
}

impl EnrichmentRecord {
    pub fn applied(name: &'static str, columns: Vec<String>) -> Self {
        Self {
            name,
            status: EnrichmentStatus::Applied { columns },
        }
    }

    pub fn skipped(name: &'static str, reason: SkipReason) -> Self {
        if reason.is_expected() {
            tracing::debug!(enrichment = name, %reason, "enrichment skipped");
        } else {
            tracing::warn!(enrichment = name, %reason, "enrichment skipped");
        }
        Self {
            name,
            status: EnrichmentStatus::Skipped { reason },
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self.status, EnrichmentStatus::Applied { .. })
    }
}
