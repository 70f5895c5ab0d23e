//! Pure projections from ingestion results, ledger rows and registry
//! snapshots into export tables.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::{Cell, DateSpan, Table};
use crate::ingestion::MergedRow;
use crate::ledger::{
    HomeEquivalents, ReportKind, SumMetric, TenderBreakdown, TerminalSum,
    TransactionHistoryRecord,
};
use crate::registry::{TerminalDirectory, TerminalSnapshot, UNKNOWN_LABEL};

const MERCHANT_TENDER_COLUMNS: [&str; 13] = [
    "sum_local_txn",
    "sum_local_txn_amount",
    "sum_visa_txn",
    "sum_visa_amount",
    "visa_dollar",
    "sum_mc_txn",
    "sum_mc_amount",
    "mc_dollar",
    "sum_up_txn",
    "sum_up_amount",
    "up_dollar",
    "sum_total_txn",
    "sum_total_amount",
];

const BRANCH_TENDER_COLUMNS: [&str; 13] = [
    "cash_advance",
    "cash_advance_amount",
    "visa_txn",
    "visa_amount",
    "visa_dollar",
    "mc_txn",
    "mc_amount",
    "mc_dollar",
    "cup_txn",
    "cup_amount",
    "cup_dollar",
    "total_txn",
    "total_amount",
];

/// Sheet name of the top-by-grand-total export.
pub const TOP_GRAND_TOTAL_SHEET: &str = "TopMerchants";

/// Column headers shared by daily and history tables of one kind.
struct Layout {
    primary_name: &'static str,
    secondary_name: &'static str,
    tenders: &'static [&'static str; 13],
}

const fn layout(kind: ReportKind) -> Layout {
    match kind {
        ReportKind::Merchant => Layout {
            primary_name: "merchant_name",
            secondary_name: "branch",
            tenders: &MERCHANT_TENDER_COLUMNS,
        },
        ReportKind::Branch => Layout {
            primary_name: "branch_name",
            secondary_name: "merchant_name",
            tenders: &BRANCH_TENDER_COLUMNS,
        },
    }
}

fn label(value: Option<&str>) -> Cell {
    Cell::text(value.unwrap_or(UNKNOWN_LABEL))
}

fn tender_cells(
    tenders: &TenderBreakdown,
    home: Option<&HomeEquivalents>,
    total_txn: i64,
    total_amount: Decimal,
) -> Vec<Cell> {
    let dollar = |value: fn(&HomeEquivalents) -> Decimal| {
        home.map_or(Cell::Empty, |h| Cell::Money(value(h)))
    };
    vec![
        Cell::Integer(tenders.local.txn_count),
        Cell::Money(tenders.local.amount),
        Cell::Integer(tenders.vc.txn_count),
        Cell::Money(tenders.vc.amount),
        dollar(|h| h.vc),
        Cell::Integer(tenders.mc.txn_count),
        Cell::Money(tenders.mc.amount),
        dollar(|h| h.mc),
        Cell::Integer(tenders.cup.txn_count),
        Cell::Money(tenders.cup.amount),
        dollar(|h| h.cup),
        Cell::Integer(total_txn),
        Cell::Money(total_amount),
    ]
}

/// Merged daily report: every extract row with registry labels, home
/// equivalents and the resulting grand total.
///
/// Merchant extracts label the row with the registry merchant name and
/// append the branch; branch extracts keep the branch name from the extract
/// and append the registry merchant name.
#[must_use]
pub fn daily_table(kind: ReportKind, rows: &[MergedRow]) -> Table {
    let layout = layout(kind);
    let sheet = match kind {
        ReportKind::Merchant => "MergedReport",
        ReportKind::Branch => "BranchReport",
    };

    let mut columns = vec![layout.primary_name, "terminal_id"];
    columns.extend_from_slice(layout.tenders);
    columns.extend([layout.secondary_name, "district", "grand_total"]);
    let mut table = Table::new(sheet, &columns);

    for merged in rows {
        let row = &merged.row;
        let (primary, secondary) = match kind {
            ReportKind::Merchant => (
                label(merged.merchant_name.as_deref()),
                label(merged.branch_name.as_deref()),
            ),
            ReportKind::Branch => (
                label(row.name.as_deref().or(merged.branch_name.as_deref())),
                label(merged.merchant_name.as_deref()),
            ),
        };

        let mut cells = vec![primary, label(row.terminal_code.as_deref())];
        cells.extend(tender_cells(
            &row.tenders,
            merged.home.as_ref(),
            row.total_txn,
            row.total_amount,
        ));
        cells.extend([
            secondary,
            label(merged.district_name.as_deref()),
            Cell::Money(merged.grand_total),
        ]);
        table.push_row(cells);
    }

    table
}

/// Ledger rows joined with registry labels.
///
/// Terminals missing from the directory keep their rows with `Unknown`
/// labels.
#[must_use]
pub fn history_table(
    kind: ReportKind,
    records: &[TransactionHistoryRecord],
    directory: &TerminalDirectory,
) -> Table {
    let layout = layout(kind);
    let sheet = match kind {
        ReportKind::Merchant => "MerchantHistory",
        ReportKind::Branch => "BranchHistory",
    };

    let mut columns = vec!["transaction_date", "terminal_id", layout.primary_name];
    columns.extend_from_slice(layout.tenders);
    columns.extend([layout.secondary_name, "district"]);
    let mut table = Table::new(sheet, &columns);

    for record in records {
        let terminal = directory.get(&record.terminal_code);
        let (primary, secondary) = match kind {
            ReportKind::Merchant => (
                terminal.map_or(record.terminal_name.as_deref(), |t| t.display_name.as_deref()),
                terminal.and_then(|t| t.branch_name.as_deref()),
            ),
            ReportKind::Branch => (
                record
                    .terminal_name
                    .as_deref()
                    .or_else(|| terminal.and_then(|t| t.branch_name.as_deref())),
                terminal.and_then(|t| t.display_name.as_deref()),
            ),
        };

        let mut cells = vec![
            Cell::Date(record.transaction_date),
            Cell::text(record.terminal_code.clone()),
            label(primary),
        ];
        cells.extend(tender_cells(
            &record.tenders,
            Some(&record.home),
            record.total_txn,
            record.total_amount,
        ));
        cells.extend([
            label(secondary),
            label(terminal.and_then(|t| t.district_name.as_deref())),
        ]);
        table.push_row(cells);
    }

    table
}

/// Terminals ranked by grand total.
#[must_use]
pub fn top_grand_total_table(ranked: &[TerminalSnapshot]) -> Table {
    let mut table = Table::new(
        TOP_GRAND_TOTAL_SHEET,
        &[
            "terminal_id",
            "merchant_name",
            "branch",
            "district",
            "grand_total",
            "last_updated",
        ],
    );

    for terminal in ranked {
        table.push_row(vec![
            Cell::text(terminal.code.clone()),
            Cell::text(terminal.display_label()),
            Cell::text(terminal.branch_label()),
            Cell::text(terminal.district_label()),
            Cell::Money(terminal.grand_total),
            terminal.grand_total_updated_at.map_or(Cell::Empty, Cell::Date),
        ]);
    }

    table
}

/// Terminals ranked by a summed ledger metric.
#[must_use]
pub fn top_metric_table(
    metric: SumMetric,
    ranked: &[TerminalSum],
    directory: &TerminalDirectory,
) -> Table {
    let (sheet, value_column) = match metric {
        SumMetric::TotalTxn => ("TopMerchantsByTxnNumber", "total_transactions"),
        SumMetric::TotalAmount => ("TopMerchantsByTxnAmount", "total_amount"),
    };
    let mut table = Table::new(
        sheet,
        &[
            "terminal_id",
            "merchant_name",
            "branch_name",
            "district_name",
            value_column,
        ],
    );

    for entry in ranked {
        let terminal = directory.get(&entry.terminal_code);
        let value = match metric {
            SumMetric::TotalTxn => {
                i64::try_from(entry.sum).map_or(Cell::Money(entry.sum), Cell::Integer)
            }
            SumMetric::TotalAmount => Cell::Money(entry.sum),
        };
        table.push_row(vec![
            Cell::text(entry.terminal_code.clone()),
            label(terminal.and_then(|t| t.display_name.as_deref())),
            label(terminal.and_then(|t| t.branch_name.as_deref())),
            label(terminal.and_then(|t| t.district_name.as_deref())),
            value,
        ]);
    }

    table
}

/// Sorts descending by `key` and keeps the first `n`.
///
/// The sort is stable: ties keep their input order.
#[must_use]
pub fn rank_top<T>(mut items: Vec<T>, key: impl Fn(&T) -> Decimal, n: usize) -> Vec<T> {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items.truncate(n);
    items
}

/// Every day in `[start, end]` absent from `recorded`, ascending.
///
/// Empty when `start` is after `end`.
#[must_use]
pub fn missing_dates_between(
    recorded: &[NaiveDate],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<NaiveDate> {
    let recorded: HashSet<NaiveDate> = recorded.iter().copied().collect();
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| !recorded.contains(day))
        .collect()
}

/// `{prefix}_{date}.{ext}` or `{prefix}_{from}_to_{to}.{ext}`.
#[must_use]
pub fn export_file_name(prefix: &str, span: DateSpan, ext: &str) -> String {
    format!("{prefix}_{span}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
    }

    #[test]
    fn test_rank_top_is_stable_and_truncates() {
        let items = vec![("a", dec!(5)), ("b", dec!(9)), ("c", dec!(5)), ("d", dec!(1))];
        let ranked = rank_top(items, |(_, v)| *v, 3);
        assert_eq!(ranked, vec![("b", dec!(9)), ("a", dec!(5)), ("c", dec!(5))]);
    }

    #[test]
    fn test_rank_top_with_fewer_items_than_limit() {
        let ranked = rank_top(vec![dec!(1), dec!(2)], |v| *v, 10);
        assert_eq!(ranked, vec![dec!(2), dec!(1)]);
    }

    #[test]
    fn test_missing_dates_between() {
        let missing = missing_dates_between(&[day(2), day(4), day(9)], day(1), day(5));
        assert_eq!(missing, vec![day(1), day(3), day(5)]);
    }

    #[test]
    fn test_missing_dates_inverted_range_is_empty() {
        assert!(missing_dates_between(&[], day(5), day(1)).is_empty());
    }

    #[test]
    fn test_export_file_names() {
        assert_eq!(
            export_file_name("daily_merchant_pos_performance", DateSpan::Day(day(3)), "csv"),
            "daily_merchant_pos_performance_2025-11-03.csv"
        );
        assert_eq!(
            export_file_name(
                "merchant_history_T1",
                DateSpan::Range {
                    from: day(1),
                    to: day(7)
                },
                "csv"
            ),
            "merchant_history_T1_2025-11-01_to_2025-11-07.csv"
        );
    }

    #[test]
    fn test_top_grand_total_table_labels() {
        let terminal = TerminalSnapshot {
            code: "T1".to_string(),
            display_name: Some("Cafe".to_string()),
            branch_name: None,
            district_name: Some("North".to_string()),
            is_retired: false,
            grand_total: dec!(150),
            grand_total_updated_at: Some(day(3)),
        };
        let table = top_grand_total_table(&[terminal]);

        assert_eq!(table.name, TOP_GRAND_TOTAL_SHEET);
        assert_eq!(table.cell(0, "branch"), Some(&Cell::text(UNKNOWN_LABEL)));
        assert_eq!(table.cell(0, "grand_total"), Some(&Cell::Money(dec!(150))));
        assert_eq!(table.cell(0, "grand_total").unwrap().to_string(), "150.00");
        assert_eq!(table.cell(0, "last_updated"), Some(&Cell::Date(day(3))));
    }

    #[test]
    fn test_history_table_unknown_terminal_keeps_row() {
        let record = TransactionHistoryRecord {
            report_kind: ReportKind::Merchant,
            terminal_code: "GONE".to_string(),
            terminal_name: None,
            tenders: TenderBreakdown::default(),
            home: HomeEquivalents::default(),
            total_txn: 2,
            total_amount: dec!(10),
            transaction_date: day(2),
        };
        let table = history_table(ReportKind::Merchant, &[record], &TerminalDirectory::default());

        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, "district"), Some(&Cell::text(UNKNOWN_LABEL)));
        assert_eq!(table.cell(0, "sum_total_txn"), Some(&Cell::Integer(2)));
    }

    #[test]
    fn test_branch_history_uses_branch_columns() {
        let table = history_table(ReportKind::Branch, &[], &TerminalDirectory::default());
        assert_eq!(table.name, "BranchHistory");
        assert!(table.columns.iter().any(|c| c == "cash_advance_amount"));
        assert!(table.columns.iter().any(|c| c == "cup_dollar"));
    }
}
