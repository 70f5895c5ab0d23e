//! Extract schema mapping.
//!
//! Raw rows arrive keyed by whatever headers the POS extract used. This step
//! resolves the headers of each extract kind, parses every numeric cell and
//! produces typed rows, so the pipeline never looks up loosely-typed columns.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::IngestionError;
use super::types::{ExtractRow, IngestionBatch, IngestionRequest, RawRow};
use crate::ledger::{ReportKind, TenderBreakdown, TenderTotals};

/// Decimal places kept for a source amount (`NUMERIC(20,4)`).
pub const SOURCE_AMOUNT_SCALE: u32 = 4;

/// Exclusive upper bound of a source amount (`NUMERIC(20,4)`).
pub const MAX_SOURCE_AMOUNT: Decimal = Decimal::from_parts(0x6FC1_0000, 0x0023_86F2, 0, false, 0); // 10_000_000_000_000_000

/// Header names of one extract layout.
#[derive(Debug, Clone, Copy)]
pub struct ExtractColumns {
    /// Terminal code.
    pub terminal_code: &'static str,
    /// Merchant or branch name.
    pub name: &'static str,
    /// Local tender count and amount.
    pub local: (&'static str, &'static str),
    /// Visa count and amount.
    pub vc: (&'static str, &'static str),
    /// Mastercard count and amount.
    pub mc: (&'static str, &'static str),
    /// UnionPay count and amount.
    pub cup: (&'static str, &'static str),
    /// Total count and amount.
    pub total: (&'static str, &'static str),
}

const MERCHANT_COLUMNS: ExtractColumns = ExtractColumns {
    terminal_code: "TERMINAL ID",
    name: "MER_ENSE",
    local: ("SUM LOCAL TXN", "SUM LOCAL TXN AMNT"),
    vc: ("SUM VISA TXN", "SUM VISA AMOUNT"),
    mc: ("SUM MC TXN", "SUM MC AMOUNT"),
    cup: ("SUM UP TXN", "SUM UP AMOUNT"),
    total: ("SUM TOTAL TXN", "SUM TOTAL AMOUNT"),
};

const BRANCH_COLUMNS: ExtractColumns = ExtractColumns {
    terminal_code: "Terminal ID",
    name: "Branch Name",
    local: ("Cash Advance", "Cash Advance Amount"),
    vc: ("VISA_TXN", "VISA_AMOUNT"),
    mc: ("MC_TXN", "MC_AMOUNT"),
    cup: ("CUP_TXN", "CUP_AMOUNT"),
    total: ("TOTAL_TXN", "TOTAL_AMOUNT"),
};

/// Header layout of an extract kind.
#[must_use]
pub const fn columns_for(kind: ReportKind) -> &'static ExtractColumns {
    match kind {
        ReportKind::Merchant => &MERCHANT_COLUMNS,
        ReportKind::Branch => &BRANCH_COLUMNS,
    }
}

/// Parses a `YYYY-MM-DD` transaction date.
///
/// # Errors
///
/// Returns `IngestionError::Validation` for a blank or malformed date.
pub fn parse_transaction_date(value: &str) -> Result<NaiveDate, IngestionError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(IngestionError::validation("transaction_date is required"));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        IngestionError::validation(format!(
            "transaction_date '{value}' is not a valid YYYY-MM-DD date"
        ))
    })
}

/// Validates a request and maps its rows onto the extract layout.
///
/// Blank numeric cells count as zero. Text that is not a number, and
/// negative values, reject the whole request.
///
/// # Errors
///
/// Returns `IngestionError::Validation` describing the first bad input.
pub fn normalize_request(request: IngestionRequest) -> Result<IngestionBatch, IngestionError> {
    let transaction_date = parse_transaction_date(&request.transaction_date)?;
    if request.rows.is_empty() {
        return Err(IngestionError::validation("report contains no rows"));
    }

    let columns = columns_for(request.report_kind);
    let rows = request
        .rows
        .iter()
        .enumerate()
        .map(|(idx, raw)| normalize_row(columns, idx + 1, raw))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(IngestionBatch {
        report_kind: request.report_kind,
        transaction_date,
        rows,
    })
}

fn normalize_row(
    columns: &ExtractColumns,
    line: usize,
    raw: &RawRow,
) -> Result<ExtractRow, IngestionError> {
    let cells = CellLookup::new(raw);
    let tender = |(count, amount): (&str, &str)| -> Result<TenderTotals, IngestionError> {
        Ok(TenderTotals {
            txn_count: cells.count(line, count)?,
            amount: cells.amount(line, amount)?,
        })
    };

    Ok(ExtractRow {
        line,
        terminal_code: cells.text(columns.terminal_code),
        name: cells.text(columns.name),
        tenders: TenderBreakdown {
            local: tender(columns.local)?,
            vc: tender(columns.vc)?,
            mc: tender(columns.mc)?,
            cup: tender(columns.cup)?,
        },
        total_txn: cells.count(line, columns.total.0)?,
        total_amount: cells.amount(line, columns.total.1)?,
    })
}

/// Case- and whitespace-insensitive header lookup over one raw row.
struct CellLookup<'a> {
    cells: HashMap<String, &'a str>,
}

impl<'a> CellLookup<'a> {
    fn new(raw: &'a RawRow) -> Self {
        Self {
            cells: raw
                .iter()
                .map(|(k, v)| (header_key(k), v.as_str()))
                .collect(),
        }
    }

    fn raw(&self, column: &str) -> Option<&'a str> {
        self.cells
            .get(&header_key(column))
            .copied()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn text(&self, column: &str) -> Option<String> {
        self.raw(column).map(str::to_string)
    }

    fn amount(&self, line: usize, column: &str) -> Result<Decimal, IngestionError> {
        let Some(value) = self.raw(column) else {
            return Ok(Decimal::ZERO);
        };
        let parsed = parse_decimal(value).ok_or_else(|| {
            IngestionError::validation(format!(
                "row {line}: column '{column}' has non-numeric value '{value}'"
            ))
        })?;
        if parsed.is_sign_negative() && !parsed.is_zero() {
            return Err(IngestionError::validation(format!(
                "row {line}: column '{column}' must not be negative"
            )));
        }
        if parsed >= MAX_SOURCE_AMOUNT {
            return Err(IngestionError::validation(format!(
                "row {line}: column '{column}' is out of range"
            )));
        }
        if parsed.normalize().scale() > SOURCE_AMOUNT_SCALE {
            return Err(IngestionError::validation(format!(
                "row {line}: column '{column}' has more than {SOURCE_AMOUNT_SCALE} decimal places"
            )));
        }
        Ok(parsed)
    }

    fn count(&self, line: usize, column: &str) -> Result<i64, IngestionError> {
        let amount = self.amount(line, column)?;
        if !amount.fract().is_zero() {
            return Err(IngestionError::validation(format!(
                "row {line}: column '{column}' must be a whole number"
            )));
        }
        i64::try_from(amount).map_err(|_| {
            IngestionError::validation(format!("row {line}: column '{column}' is out of range"))
        })
    }
}

fn header_key(header: &str) -> String {
    header.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
}

fn parse_decimal(value: &str) -> Option<Decimal> {
    let cleaned: String = value.chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}
