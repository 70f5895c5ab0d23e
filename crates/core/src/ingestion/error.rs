//! Ingestion error types.

use chrono::NaiveDate;
use posrecon_shared::{AppError, CurrencyCode};
use thiserror::Error;

use crate::ledger::ReportKind;
use crate::repository::StoreError;

/// Errors that reject a whole batch before it is committed.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    /// A batch of this kind was already ingested for the date.
    #[error("{kind} report for {date} already uploaded")]
    DuplicateBatch {
        /// Extract layout.
        kind: ReportKind,
        /// Transaction date.
        date: NaiveDate,
    },

    /// One or more exchange rates were not set on the transaction date.
    #[error(
        "Currency exchange rate is outdated for {date}. Please update currency before uploading the report. Missing: {}",
        join_codes(.currencies)
    )]
    StaleRate {
        /// Transaction date.
        date: NaiveDate,
        /// Every missing or stale currency.
        currencies: Vec<CurrencyCode>,
    },

    /// Registry or ledger failure; the batch is not committed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IngestionError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

fn join_codes(codes: &[CurrencyCode]) -> String {
    codes
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<IngestionError> for AppError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::Validation(msg) => Self::Validation(msg),
            err @ IngestionError::DuplicateBatch { .. } => Self::Conflict(err.to_string()),
            err @ IngestionError::StaleRate { .. } => Self::BusinessRule(err.to_string()),
            IngestionError::Store(store) => store.into(),
        }
    }
}
