//! Ingestion pipeline service.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use posrecon_shared::CurrencyCode;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::IngestionError;
use super::schema::normalize_request;
use super::types::{
    ExtractRow, IngestionBatch, IngestionReport, IngestionRequest, MergedRow, RowDisposition,
    RowIssue, RowIssueReason,
};
use crate::currency::{ConversionError, RateSnapshot, stale_currencies, to_home_currency};
use crate::ledger::{HomeEquivalents, LedgerBatch, ReportKind, TransactionHistoryRecord};
use crate::registry::{Accumulation, TerminalDirectory, accumulate};
use crate::reports::projection::daily_table;
use crate::repository::{ExchangeRateStore, StoreError, TerminalRegistry, TransactionLedger};

/// Currencies whose rates gate every batch.
pub const REQUIRED_CURRENCIES: [CurrencyCode; 3] = CurrencyCode::ALL;

/// Daily report ingestion pipeline.
///
/// Runs one batch to completion: validation, conversion, once-per-day
/// accumulation, then a single bulk ledger write. Callers must not run two
/// ingestions concurrently; the batch marker only turns a lost race into a
/// `DuplicateBatch` at commit time.
pub struct IngestionService<R, X, L>
where
    R: TerminalRegistry,
    X: ExchangeRateStore,
    L: TransactionLedger,
{
    registry: Arc<R>,
    rates: Arc<X>,
    ledger: Arc<L>,
}

/// Per-batch state threaded through row processing.
struct BatchContext {
    kind: ReportKind,
    date: NaiveDate,
    rates: RateSnapshot,
    directory: TerminalDirectory,
    recorded: HashSet<String>,
    records: Vec<TransactionHistoryRecord>,
    issues: Vec<RowIssue>,
}

impl<R, X, L> IngestionService<R, X, L>
where
    R: TerminalRegistry,
    X: ExchangeRateStore,
    L: TransactionLedger,
{
    /// Create a new ingestion service.
    #[must_use]
    pub fn new(registry: Arc<R>, rates: Arc<X>, ledger: Arc<L>) -> Self {
        Self {
            registry,
            rates,
            ledger,
        }
    }

    /// Normalizes a raw extract and ingests it.
    ///
    /// # Errors
    ///
    /// See [`IngestionService::ingest_batch`]; additionally returns
    /// `Validation` for a malformed date or cell.
    pub async fn ingest(&self, request: IngestionRequest) -> Result<IngestionReport, IngestionError> {
        let batch = normalize_request(request)?;
        self.ingest_batch(batch).await
    }

    /// Ingests a normalized extract.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The batch has no rows
    /// - A batch of the same kind was already ingested for the date
    /// - Any required exchange rate was not set on the transaction date
    /// - The registry or ledger fails
    pub async fn ingest_batch(
        &self,
        batch: IngestionBatch,
    ) -> Result<IngestionReport, IngestionError> {
        let IngestionBatch {
            report_kind: kind,
            transaction_date: date,
            rows,
        } = batch;

        if rows.is_empty() {
            return Err(IngestionError::validation("report contains no rows"));
        }

        if self.ledger.exists_for_date(kind, date).await? {
            warn!(%kind, %date, "rejecting duplicate batch");
            return Err(IngestionError::DuplicateBatch { kind, date });
        }

        let rates = RateSnapshot::from_rates(self.rates.lookup_rates(&REQUIRED_CURRENCIES).await?);
        let stale = stale_currencies(&REQUIRED_CURRENCIES, &rates, date);
        if !stale.is_empty() {
            warn!(%kind, %date, stale = ?stale, "rejecting batch with outdated exchange rates");
            return Err(IngestionError::StaleRate {
                date,
                currencies: stale,
            });
        }

        let directory = TerminalDirectory::from_snapshots(self.registry.lookup_all().await?);
        info!(
            %kind,
            %date,
            rows = rows.len(),
            terminals = directory.len(),
            "ingesting batch"
        );

        let mut ctx = BatchContext {
            kind,
            date,
            rates,
            directory,
            recorded: HashSet::new(),
            records: Vec::with_capacity(rows.len()),
            issues: Vec::new(),
        };

        let mut merged_rows = Vec::with_capacity(rows.len());
        for row in rows {
            let merged = self.process_row(&mut ctx, row).await?;
            merged_rows.push(merged);
        }

        let batch_id = Uuid::now_v7();
        let BatchContext {
            records, issues, ..
        } = ctx;
        let ledger_rows_written = self
            .ledger
            .bulk_insert(LedgerBatch {
                batch_id,
                report_kind: kind,
                transaction_date: date,
                records,
            })
            .await
            .map_err(|err| match err {
                StoreError::Conflict(msg) => {
                    warn!(%kind, %date, %msg, "batch marker conflict on commit");
                    IngestionError::DuplicateBatch { kind, date }
                }
                other => IngestionError::Store(other),
            })?;

        let skipped = merged_rows
            .iter()
            .filter(|r| !r.disposition.is_recorded())
            .count();
        info!(
            %batch_id,
            %kind,
            %date,
            ledger_rows_written,
            skipped,
            issues = issues.len(),
            "batch committed"
        );

        let export_table = daily_table(kind, &merged_rows);
        Ok(IngestionReport {
            batch_id,
            report_kind: kind,
            transaction_date: date,
            ledger_rows_written,
            merged_rows,
            export_table,
            issues,
        })
    }

    async fn process_row(
        &self,
        ctx: &mut BatchContext,
        row: ExtractRow,
    ) -> Result<MergedRow, IngestionError> {
        let home = match convert_row(&row, &ctx.rates) {
            Ok(home) => Some(home),
            Err(err) => {
                warn!(line = row.line, terminal = ?row.terminal_code, error = %err, "conversion failed");
                ctx.issues.push(RowIssue {
                    line: row.line,
                    terminal_code: row.terminal_code.clone(),
                    reason: RowIssueReason::Computation(err),
                });
                None
            }
        };

        let Some(code) = row.terminal_code.clone() else {
            debug!(line = row.line, "row without terminal code");
            return Ok(unresolved(row, home, RowDisposition::BlankCode));
        };

        let Some(terminal) = ctx.directory.get(&code).cloned() else {
            warn!(line = row.line, terminal = %code, "terminal not in registry");
            return Ok(unresolved(row, home, RowDisposition::UnknownTerminal));
        };

        let mut merged = MergedRow {
            merchant_name: terminal.display_name.clone(),
            branch_name: terminal.branch_name.clone(),
            district_name: terminal.district_name.clone(),
            home,
            grand_total: terminal.grand_total,
            disposition: RowDisposition::Recorded,
            row,
        };

        if terminal.is_retired {
            debug!(terminal = %code, "retired terminal excluded");
            merged.disposition = RowDisposition::RetiredTerminal;
            return Ok(merged);
        }

        let Some(home) = home else {
            merged.disposition = RowDisposition::ComputationFailed;
            return Ok(merged);
        };

        if ctx.recorded.contains(&code) {
            warn!(line = merged.row.line, terminal = %code, "duplicate terminal row in batch");
            ctx.issues.push(RowIssue {
                line: merged.row.line,
                terminal_code: Some(code),
                reason: RowIssueReason::DuplicateTerminal,
            });
            merged.disposition = RowDisposition::DuplicateTerminal;
            return Ok(merged);
        }

        let accumulation = match accumulate(&terminal, merged.row.total_amount, ctx.date) {
            Ok(accumulation) => accumulation,
            Err(err) => {
                warn!(line = merged.row.line, terminal = %code, error = %err, "accumulation failed");
                ctx.issues.push(RowIssue {
                    line: merged.row.line,
                    terminal_code: Some(code),
                    reason: RowIssueReason::Computation(err),
                });
                merged.disposition = RowDisposition::ComputationFailed;
                return Ok(merged);
            }
        };

        match accumulation {
            Accumulation::Bump {
                previous,
                new_total,
                as_of,
            } => match self.registry.bump_grand_total(&code, new_total, as_of).await {
                Ok(true) => {
                    debug!(terminal = %code, %previous, %new_total, "grand total bumped");
                    ctx.directory.record_bump(&code, new_total, as_of);
                    merged.grand_total = new_total;
                }
                Ok(false) => {
                    debug!(terminal = %code, %as_of, "grand total accumulated by another batch");
                }
                Err(StoreError::NotFound(_)) => {
                    warn!(terminal = %code, "terminal vanished before grand total update");
                    ctx.issues.push(RowIssue {
                        line: merged.row.line,
                        terminal_code: Some(code),
                        reason: RowIssueReason::TerminalVanished,
                    });
                    merged.disposition = RowDisposition::TerminalVanished;
                    return Ok(merged);
                }
                Err(err) => return Err(err.into()),
            },
            Accumulation::AlreadyApplied { total } => {
                debug!(terminal = %code, %total, "grand total already accumulated for date");
            }
        }

        ctx.records.push(TransactionHistoryRecord {
            report_kind: ctx.kind,
            terminal_code: code.clone(),
            terminal_name: merged.row.name.clone(),
            tenders: merged.row.tenders,
            home,
            total_txn: merged.row.total_txn,
            total_amount: merged.row.total_amount,
            transaction_date: ctx.date,
        });
        ctx.recorded.insert(code);

        Ok(merged)
    }
}

/// Converts the foreign tenders of a row into the home currency.
fn convert_row(row: &ExtractRow, rates: &RateSnapshot) -> Result<HomeEquivalents, ConversionError> {
    let mut home = HomeEquivalents::default();
    for currency in REQUIRED_CURRENCIES {
        // Presence was checked by the freshness gate.
        let rate = rates.rate(currency).unwrap_or_default();
        let amount = row.tenders.foreign(currency).amount;
        home.set(currency, to_home_currency(currency, amount, rate)?);
    }
    Ok(home)
}

fn unresolved(
    row: ExtractRow,
    home: Option<HomeEquivalents>,
    disposition: RowDisposition,
) -> MergedRow {
    MergedRow {
        row,
        merchant_name: None,
        branch_name: None,
        district_name: None,
        home,
        grand_total: Decimal::ZERO,
        disposition,
    }
}
