//! Subcommand handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use posrecon_core::ingestion::{IngestionRequest, IngestionService};
use posrecon_core::ledger::{LedgerFilter, ReportKind, SumMetric};
use posrecon_core::reports::{DateSpan, ExportService, export_file_name};
use posrecon_db::{ExchangeRateRepository, LedgerRepository, RateUpdate, TerminalRepository};
use posrecon_shared::AppError;
use posrecon_shared::config::ReportingConfig;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::tabular::{TableFormat, read_rows_from_path, write_table_to_dir};
use crate::{ExportArgs, ExportReport};

/// Repositories and settings shared by every subcommand.
pub struct Context {
    registry: Arc<TerminalRepository>,
    rates: Arc<ExchangeRateRepository>,
    ledger: Arc<LedgerRepository>,
    reporting: ReportingConfig,
}

impl Context {
    pub fn new(db: DatabaseConnection, reporting: ReportingConfig) -> Self {
        Self {
            registry: Arc::new(TerminalRepository::new(db.clone())),
            rates: Arc::new(ExchangeRateRepository::new(db.clone())),
            ledger: Arc::new(LedgerRepository::new(db)),
            reporting,
        }
    }

    fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.reporting.output_dir)
    }

    fn exports(&self) -> ExportService<TerminalRepository, LedgerRepository> {
        ExportService::new(Arc::clone(&self.registry), Arc::clone(&self.ledger))
            .with_top_n(self.reporting.top_n)
    }

    pub async fn ingest(&self, kind: ReportKind, date: String, file: &Path) -> anyhow::Result<()> {
        let rows = read_rows_from_path(file)?;
        info!(%kind, file = %file.display(), rows = rows.len(), "extract loaded");

        let service = IngestionService::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.rates),
            Arc::clone(&self.ledger),
        );
        let report = service
            .ingest(IngestionRequest {
                report_kind: kind,
                transaction_date: date,
                rows,
            })
            .await
            .map_err(AppError::from)?;

        for issue in &report.issues {
            warn!(
                line = issue.line,
                terminal = issue.terminal_code.as_deref().unwrap_or_default(),
                reason = %issue.reason,
                "row not recorded"
            );
        }

        let file_name = export_file_name(
            kind.daily_report_prefix(),
            DateSpan::Day(report.transaction_date),
            TableFormat::Csv.extension(),
        );
        let path = write_table_to_dir(
            &report.export_table,
            &self.output_dir(),
            &file_name,
            TableFormat::Csv,
        )?;

        println!(
            "{kind} report for {} ingested: {} ledger rows, {} issues, written to {}",
            report.transaction_date,
            report.ledger_rows_written,
            report.issues.len(),
            path.display()
        );
        Ok(())
    }

    pub async fn set_rates(
        &self,
        vc: Decimal,
        mc: Decimal,
        cup: Decimal,
        date: Option<NaiveDate>,
    ) -> anyhow::Result<()> {
        let as_of = date.unwrap_or_else(|| Utc::now().date_naive());
        let updated = self
            .rates
            .update_rates(RateUpdate { vc, mc, cup }, as_of)
            .await
            .map_err(AppError::from)?;

        for rate in updated {
            println!("{} = {} (as of {})", rate.currency, rate.rate, rate.last_updated);
        }
        Ok(())
    }

    pub async fn export(&self, args: ExportArgs) -> anyhow::Result<()> {
        let today = Utc::now().date_naive();
        let span = match (args.from, args.to) {
            (Some(from), Some(to)) => DateSpan::Range { from, to },
            (Some(day), None) | (None, Some(day)) => DateSpan::Day(day),
            (None, None) => DateSpan::Day(today),
        };
        let exports = self.exports();

        let (table, prefix) = match args.report {
            ExportReport::MerchantHistory | ExportReport::BranchHistory => {
                let kind = if matches!(args.report, ExportReport::MerchantHistory) {
                    ReportKind::Merchant
                } else {
                    ReportKind::Branch
                };
                let filter = LedgerFilter {
                    report_kind: kind,
                    terminal_code: args.terminal.clone(),
                    from: args.from,
                    to: args.to,
                };
                let prefix = match &args.terminal {
                    Some(code) => format!("{}_{code}", kind.history_prefix()),
                    None => kind.history_prefix().to_string(),
                };
                (exports.history(&filter).await.map_err(AppError::from)?, prefix)
            }
            ExportReport::TopGrandTotal => (
                exports.top_by_grand_total().await.map_err(AppError::from)?,
                "top_merchants_by_grand_total".to_string(),
            ),
            ExportReport::TopTxnCount | ExportReport::TopTxnAmount => {
                let (metric, prefix) = if matches!(args.report, ExportReport::TopTxnCount) {
                    (SumMetric::TotalTxn, "top_merchants_by_txn_number")
                } else {
                    (SumMetric::TotalAmount, "top_merchants_by_txn_amount")
                };
                let table = exports
                    .top_by_metric(args.kind.into(), args.from, args.to, metric)
                    .await
                    .map_err(AppError::from)?;
                (table, prefix.to_string())
            }
        };

        let file_name = export_file_name(&prefix, span, args.format.extension());
        let path = write_table_to_dir(&table, &self.output_dir(), &file_name, args.format)?;
        println!("{} rows written to {}", table.len(), path.display());
        Ok(())
    }

    pub async fn missing_dates(&self, kind: ReportKind) -> anyhow::Result<()> {
        let end = Utc::now().date_naive();
        let report = self
            .exports()
            .missing_dates(kind, self.reporting.history_start_date, end)
            .await
            .map_err(AppError::from)?;

        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}
