//! Report export service.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use super::error::ReportError;
use super::projection::{
    history_table, missing_dates_between, rank_top, top_grand_total_table, top_metric_table,
};
use super::types::{MissingDatesReport, Table};
use crate::ledger::{LedgerFilter, ReportKind, SumMetric};
use crate::registry::TerminalDirectory;
use crate::repository::{TerminalRegistry, TransactionLedger};

/// Default number of terminals in a top-N export.
pub const DEFAULT_TOP_N: usize = 10;

/// Read-only exports over the registry and the history ledger.
pub struct ExportService<R, L>
where
    R: TerminalRegistry,
    L: TransactionLedger,
{
    registry: Arc<R>,
    ledger: Arc<L>,
    top_n: usize,
}

impl<R, L> ExportService<R, L>
where
    R: TerminalRegistry,
    L: TransactionLedger,
{
    /// Create a new export service ranking the default top 10.
    #[must_use]
    pub fn new(registry: Arc<R>, ledger: Arc<L>) -> Self {
        Self {
            registry,
            ledger,
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Overrides the number of terminals kept by top-N exports.
    #[must_use]
    pub const fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Ledger history matching `filter`, labelled from the registry.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` when `from` is after `to`, or a store error.
    pub async fn history(&self, filter: &LedgerFilter) -> Result<Table, ReportError> {
        check_range(filter.from, filter.to)?;

        let records = self.ledger.query(filter).await?;
        let directory = TerminalDirectory::from_snapshots(self.registry.lookup_all().await?);
        debug!(kind = %filter.report_kind, rows = records.len(), "history export");

        Ok(history_table(filter.report_kind, &records, &directory))
    }

    /// Terminals with the highest grand totals, retired ones included.
    ///
    /// # Errors
    ///
    /// Returns a store error if the registry cannot be read.
    pub async fn top_by_grand_total(&self) -> Result<Table, ReportError> {
        let terminals = self.registry.lookup_all().await?;
        let ranked = rank_top(terminals, |t| t.grand_total, self.top_n);
        Ok(top_grand_total_table(&ranked))
    }

    /// Terminals with the highest summed metric over an optional range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` when `from` is after `to`, or a store error.
    pub async fn top_by_metric(
        &self,
        kind: ReportKind,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        metric: SumMetric,
    ) -> Result<Table, ReportError> {
        check_range(from, to)?;

        let filter = LedgerFilter {
            report_kind: kind,
            terminal_code: None,
            from,
            to,
        };
        let sums = self.ledger.group_sum_by_terminal(&filter, metric).await?;
        let ranked = rank_top(sums, |s| s.sum, self.top_n);
        let directory = TerminalDirectory::from_snapshots(self.registry.lookup_all().await?);

        Ok(top_metric_table(metric, &ranked, &directory))
    }

    /// Days in `[start, end]` without any ledger row of `kind`.
    ///
    /// # Errors
    ///
    /// Returns a store error if the ledger cannot be read.
    pub async fn missing_dates(
        &self,
        kind: ReportKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MissingDatesReport, ReportError> {
        let recorded = if start <= end {
            self.ledger.recorded_dates(kind, start, end).await?
        } else {
            Vec::new()
        };
        let missing_dates = missing_dates_between(&recorded, start, end);

        Ok(MissingDatesReport {
            start_date: start,
            end_date: end,
            total_missing_days: missing_dates.len(),
            missing_dates,
        })
    }
}

fn check_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<(), ReportError> {
    match (from, to) {
        (Some(start), Some(end)) if start > end => Err(ReportError::InvalidDateRange { start, end }),
        _ => Ok(()),
    }
}
