//! Ledger data types.

use chrono::NaiveDate;
use posrecon_shared::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Layout of a daily extract.
///
/// Both kinds share the pipeline; each has its own history partition and
/// its own duplicate-batch guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Per-merchant POS performance extract.
    Merchant,
    /// Per-branch POS performance extract.
    Branch,
}

impl ReportKind {
    /// Stored discriminator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Merchant => "merchant",
            Self::Branch => "branch",
        }
    }

    /// File name prefix of the merged daily report.
    #[must_use]
    pub const fn daily_report_prefix(self) -> &'static str {
        match self {
            Self::Merchant => "daily_merchant_pos_performance",
            Self::Branch => "daily_branch_pos_performance",
        }
    }

    /// File name prefix of the history export.
    #[must_use]
    pub const fn history_prefix(self) -> &'static str {
        match self {
            Self::Merchant => "merchant_history",
            Self::Branch => "branch_history",
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "merchant" => Ok(Self::Merchant),
            "branch" => Ok(Self::Branch),
            _ => Err(format!("Unknown report kind: {s}")),
        }
    }
}

/// Transaction count and amount for one tender type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderTotals {
    /// Number of transactions.
    pub txn_count: i64,
    /// Amount in source units.
    pub amount: Decimal,
}

/// Per-tender totals of one extract row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderBreakdown {
    /// Local tender (local cards or cash advance), not converted.
    pub local: TenderTotals,
    /// Visa.
    pub vc: TenderTotals,
    /// Mastercard.
    pub mc: TenderTotals,
    /// UnionPay.
    pub cup: TenderTotals,
}

impl TenderBreakdown {
    /// Totals of a foreign card tender.
    #[must_use]
    pub const fn foreign(&self, currency: CurrencyCode) -> &TenderTotals {
        match currency {
            CurrencyCode::Vc => &self.vc,
            CurrencyCode::Mc => &self.mc,
            CurrencyCode::Cup => &self.cup,
        }
    }
}

/// Home-currency equivalents of the foreign tenders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeEquivalents {
    /// Visa amount in home currency.
    pub vc: Decimal,
    /// Mastercard amount in home currency.
    pub mc: Decimal,
    /// UnionPay amount in home currency.
    pub cup: Decimal,
}

impl HomeEquivalents {
    /// Equivalent for one currency.
    #[must_use]
    pub const fn get(&self, currency: CurrencyCode) -> Decimal {
        match currency {
            CurrencyCode::Vc => self.vc,
            CurrencyCode::Mc => self.mc,
            CurrencyCode::Cup => self.cup,
        }
    }

    /// Sets the equivalent for one currency.
    pub fn set(&mut self, currency: CurrencyCode, value: Decimal) {
        match currency {
            CurrencyCode::Vc => self.vc = value,
            CurrencyCode::Mc => self.mc = value,
            CurrencyCode::Cup => self.cup = value,
        }
    }
}

/// Immutable history row for one terminal on one transaction date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHistoryRecord {
    /// Extract layout the row came from.
    pub report_kind: ReportKind,
    /// Terminal code.
    pub terminal_code: String,
    /// Name carried by the extract row (merchant or branch name).
    pub terminal_name: Option<String>,
    /// Raw per-tender counts and amounts.
    pub tenders: TenderBreakdown,
    /// Converted foreign tenders.
    pub home: HomeEquivalents,
    /// Total transaction count.
    pub total_txn: i64,
    /// Total amount.
    pub total_amount: Decimal,
    /// Calendar day of the extract.
    pub transaction_date: NaiveDate,
}

/// Records of one ingested extract, written together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerBatch {
    /// Batch identifier, stored with the batch marker.
    pub batch_id: Uuid,
    /// Extract layout.
    pub report_kind: ReportKind,
    /// Day the batch claims.
    pub transaction_date: NaiveDate,
    /// History rows; may be empty when every terminal was skipped.
    pub records: Vec<TransactionHistoryRecord>,
}

/// Ledger query filter. Date bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerFilter {
    /// Extract layout to read.
    pub report_kind: ReportKind,
    /// Restrict to one terminal.
    pub terminal_code: Option<String>,
    /// First day included.
    pub from: Option<NaiveDate>,
    /// Last day included.
    pub to: Option<NaiveDate>,
}

impl LedgerFilter {
    /// Filter matching every record of a kind.
    #[must_use]
    pub const fn all(report_kind: ReportKind) -> Self {
        Self {
            report_kind,
            terminal_code: None,
            from: None,
            to: None,
        }
    }

    /// Restricts the filter to one terminal.
    #[must_use]
    pub fn for_terminal(mut self, code: impl Into<String>) -> Self {
        self.terminal_code = Some(code.into());
        self
    }

    /// Restricts the filter to an inclusive date range.
    #[must_use]
    pub const fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// Whether a record passes the filter.
    #[must_use]
    pub fn matches(&self, record: &TransactionHistoryRecord) -> bool {
        record.report_kind == self.report_kind
            && self
                .terminal_code
                .as_deref()
                .is_none_or(|code| record.terminal_code == code)
            && self.from.is_none_or(|from| record.transaction_date >= from)
            && self.to.is_none_or(|to| record.transaction_date <= to)
    }
}

/// Numeric ledger field summed per terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SumMetric {
    /// Total transaction count.
    TotalTxn,
    /// Total amount.
    TotalAmount,
}

impl SumMetric {
    /// Value of this metric on one record.
    #[must_use]
    pub fn value_of(self, record: &TransactionHistoryRecord) -> Decimal {
        match self {
            Self::TotalTxn => Decimal::from(record.total_txn),
            Self::TotalAmount => record.total_amount,
        }
    }
}

/// Per-terminal sum of a metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalSum {
    /// Terminal code.
    pub terminal_code: String,
    /// Summed metric.
    pub sum: Decimal,
}
