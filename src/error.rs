//! Error types for PeakForm

use thiserror::Error;

/// Errors that can occur while loading exports or emitting reports.
///
/// Analysis itself never fails: missing cells, columns, sheets, and empty
/// windows all degrade to absent result fields. Only an unreadable source
/// or a table with no usable date column is fatal.
#[derive(Debug, Error)]
pub enum PeakformError {
    #[error("Failed to read source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("No usable date column in table: {0}")]
    MissingDateColumn(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
