//! Report exports.
//!
//! Read-only projections of the ledger and the registry into flat tables:
//! - Merged daily report (produced by ingestion)
//! - Merchant and branch transaction history
//! - Top terminals by grand total
//! - Top terminals by summed transaction count or amount
//! - Missing transaction dates

pub mod error;
pub mod projection;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use projection::{export_file_name, missing_dates_between, rank_top};
pub use service::{DEFAULT_TOP_N, ExportService};
pub use types::{Cell, DateSpan, MissingDatesReport, Table};
