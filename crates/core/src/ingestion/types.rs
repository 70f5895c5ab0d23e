//! Ingestion data types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::currency::ConversionError;
use crate::ledger::{HomeEquivalents, ReportKind, TenderBreakdown};
use crate::reports::Table;

/// One extract row as read from the tabular source: header -> cell text.
pub type RawRow = BTreeMap<String, String>;

/// An uploaded extract before normalization.
#[derive(Debug, Clone)]
pub struct IngestionRequest {
    /// Extract layout.
    pub report_kind: ReportKind,
    /// Transaction date as supplied by the caller (`YYYY-MM-DD`).
    pub transaction_date: String,
    /// Raw rows in file order.
    pub rows: Vec<RawRow>,
}

/// A normalized extract row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractRow {
    /// 1-based position in the extract.
    pub line: usize,
    /// Terminal code; `None` when the cell was blank.
    pub terminal_code: Option<String>,
    /// Merchant or branch name carried by the extract.
    pub name: Option<String>,
    /// Per-tender counts and amounts.
    pub tenders: TenderBreakdown,
    /// Total transaction count.
    pub total_txn: i64,
    /// Total amount.
    pub total_amount: Decimal,
}

/// A validated extract for one transaction date.
#[derive(Debug, Clone)]
pub struct IngestionBatch {
    /// Extract layout.
    pub report_kind: ReportKind,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Rows in file order.
    pub rows: Vec<ExtractRow>,
}

/// What happened to a row during ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowDisposition {
    /// Ledger row written.
    Recorded,
    /// Terminal code cell was blank.
    BlankCode,
    /// Code not present in the registry.
    UnknownTerminal,
    /// Terminal is retired.
    RetiredTerminal,
    /// A second row for a terminal already recorded in this batch.
    DuplicateTerminal,
    /// Home-currency conversion failed.
    ComputationFailed,
    /// Terminal disappeared from the registry during the batch.
    TerminalVanished,
}

impl RowDisposition {
    /// Whether the row produced a ledger record.
    #[must_use]
    pub const fn is_recorded(self) -> bool {
        matches!(self, Self::Recorded)
    }
}

/// An extract row annotated with registry data, as exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedRow {
    /// The normalized extract row.
    pub row: ExtractRow,
    /// Merchant name from the registry.
    pub merchant_name: Option<String>,
    /// Branch name from the registry.
    pub branch_name: Option<String>,
    /// District name from the registry.
    pub district_name: Option<String>,
    /// Converted foreign tenders; `None` when conversion failed.
    pub home: Option<HomeEquivalents>,
    /// Terminal total after this batch, zero when unresolved.
    pub grand_total: Decimal,
    /// Outcome for this row.
    pub disposition: RowDisposition,
}

/// Row-level problem that did not abort the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    /// 1-based position in the extract.
    pub line: usize,
    /// Terminal code, if present.
    pub terminal_code: Option<String>,
    /// What went wrong.
    pub reason: RowIssueReason,
}

/// Cause of a row issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIssueReason {
    /// Conversion produced no finite amount.
    Computation(ConversionError),
    /// Registry no longer knows the terminal.
    TerminalVanished,
    /// Terminal already has a row in this batch.
    DuplicateTerminal,
}

impl std::fmt::Display for RowIssueReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Computation(err) => write!(f, "computation error: {err}"),
            Self::TerminalVanished => f.write_str("terminal no longer in registry"),
            Self::DuplicateTerminal => f.write_str("terminal already recorded in this batch"),
        }
    }
}

/// Result of a committed batch.
#[derive(Debug, Clone)]
pub struct IngestionReport {
    /// Batch identifier stored with the batch marker.
    pub batch_id: Uuid,
    /// Extract layout.
    pub report_kind: ReportKind,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Ledger rows written.
    pub ledger_rows_written: u64,
    /// Every input row, annotated.
    pub merged_rows: Vec<MergedRow>,
    /// Merged table for export.
    pub export_table: Table,
    /// Rows excluded because of row-level problems.
    pub issues: Vec<RowIssue>,
}
