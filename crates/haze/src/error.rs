//! Error types for series operations.

use thiserror::Error;

/// Result type for series operations.
pub type Result<T> = std::result::Result<T, SeriesError>;

/// Errors that can occur while building or transforming series tables.
#[derive(Debug, Error)]
pub enum SeriesError {
    /// Two rows share the same calendar date
    #[error("duplicate date {date} in series '{series}'")]
    DuplicateDate {
        /// Series the duplicate was found in
        series: String,
        /// The offending date
        date: chrono::NaiveDate,
    },

    /// Frame does not satisfy the (date, value) schema or its invariants
    #[error("invalid frame for series '{series}': {reason}")]
    InvalidFrame {
        /// Series being constructed
        series: String,
        /// Why the frame was rejected
        reason: String,
    },

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
