//! Engine error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Account name and value of one split, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSummary {
    /// Fully-qualified account name.
    pub account: String,
    /// Raw split value.
    pub value: Decimal,
}

impl fmt::Display for SplitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.account, self.value)
    }
}

fn join_splits(splits: &[SplitSummary]) -> String {
    splits
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while building or writing a report.
#[derive(Debug, Error)]
pub enum FluxError {
    /// The asset list cannot be read.
    #[error("failed to read asset list {path}: {source}")]
    Config {
        /// The asset list path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A transaction does not have exactly two splits.
    #[error(
        "transaction on {date} must have exactly 2 splits, found {}: {}",
        .splits.len(),
        join_splits(.splits)
    )]
    Structural {
        /// Date of the offending transaction.
        date: NaiveDate,
        /// Every split of the transaction.
        splits: Vec<SplitSummary>,
    },

    /// The report cannot be written.
    #[error("failed to write report {path}: {source}")]
    Io {
        /// The output path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The report cannot be encoded as CSV.
    #[error("failed to encode report: {0}")]
    Csv(#[from] csv::Error),

    /// A report option is out of range.
    #[error("invalid option: {0}")]
    InvalidOption(String),
}

impl FluxError {
    /// Whether this error comes from a malformed transaction.
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::Structural { .. })
    }
}

/// Result type alias for engine operations.
pub type FluxResult<T> = Result<T, FluxError>;
