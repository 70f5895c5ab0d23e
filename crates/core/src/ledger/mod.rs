//! Transaction history ledger types.
//!
//! The ledger is append-only: one record per terminal per ingested date and
//! extract kind. Nothing in this crate updates or deletes a record.

pub mod types;

pub use types::{
    HomeEquivalents, LedgerBatch, LedgerFilter, ReportKind, SumMetric, TenderBreakdown,
    TenderTotals, TerminalSum, TransactionHistoryRecord,
};
