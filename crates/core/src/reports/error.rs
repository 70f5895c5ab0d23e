//! Report error types.

use chrono::NaiveDate;
use posrecon_shared::AppError;
use thiserror::Error;

use crate::repository::StoreError;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            err @ ReportError::InvalidDateRange { .. } => Self::Validation(err.to_string()),
            ReportError::Store(store) => store.into(),
        }
    }
}
