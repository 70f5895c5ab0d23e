//! Storage seams used by the ingestion pipeline and the exporter.
//!
//! These traits are implemented by the db crate to provide actual database
//! operations, and by in-memory doubles in tests.

use std::future::Future;

use chrono::NaiveDate;
use posrecon_shared::{AppError, CurrencyCode};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::currency::ExchangeRate;
use crate::ledger::{
    LedgerBatch, LedgerFilter, ReportKind, SumMetric, TerminalSum, TransactionHistoryRecord,
};
use crate::registry::TerminalSnapshot;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Row addressed by key does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write rejected by a uniqueness constraint.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Backend unreachable or failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create a backend error.
    #[must_use]
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => Self::NotFound(msg),
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Backend(msg) => Self::Database(msg),
        }
    }
}

/// Terminal registry: identity, linkage and the running aggregate.
pub trait TerminalRegistry: Send + Sync {
    /// Every terminal, retired ones included.
    fn lookup_all(&self) -> impl Future<Output = Result<Vec<TerminalSnapshot>, StoreError>> + Send;

    /// Sets a terminal's grand total and the day it was accumulated for,
    /// unless it was already accumulated for `as_of`.
    ///
    /// Returns `Ok(false)` when the day was already applied, and
    /// `StoreError::NotFound` for an unknown code.
    fn bump_grand_total(
        &self,
        code: &str,
        new_total: Decimal,
        as_of: NaiveDate,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

/// Exchange rate store.
pub trait ExchangeRateStore: Send + Sync {
    /// Current rates for the given codes; absent codes are simply missing.
    fn lookup_rates(
        &self,
        codes: &[CurrencyCode],
    ) -> impl Future<Output = Result<Vec<ExchangeRate>, StoreError>> + Send;
}

/// Append-only transaction history ledger.
pub trait TransactionLedger: Send + Sync {
    /// Whether any batch of this kind was already ingested for `date`.
    fn exists_for_date(
        &self,
        kind: ReportKind,
        date: NaiveDate,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Writes the batch marker and all records atomically.
    ///
    /// Returns the number of records written, or `StoreError::Conflict` when
    /// another batch already claimed the same kind and date.
    fn bulk_insert(
        &self,
        batch: LedgerBatch,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Records matching the filter, in insertion order.
    fn query(
        &self,
        filter: &LedgerFilter,
    ) -> impl Future<Output = Result<Vec<TransactionHistoryRecord>, StoreError>> + Send;

    /// Metric summed per terminal, terminals in order of first appearance.
    fn group_sum_by_terminal(
        &self,
        filter: &LedgerFilter,
        metric: SumMetric,
    ) -> impl Future<Output = Result<Vec<TerminalSum>, StoreError>> + Send;

    /// Distinct days with ledger rows of this kind within `[from, to]`.
    fn recorded_dates(
        &self,
        kind: ReportKind,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = Result<Vec<NaiveDate>, StoreError>> + Send;
}
