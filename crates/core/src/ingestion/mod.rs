//! Daily extract ingestion and reconciliation.
//!
//! The pipeline validates a whole extract before touching any state:
//! - Transaction date and cell values are normalized into typed rows
//! - A batch already ingested for the same kind and date is rejected
//! - Every exchange rate must have been set on the transaction date
//!
//! Rows are then converted, accumulated into terminal grand totals at most
//! once per day, and appended to the history ledger in one bulk write.

pub mod error;
pub mod schema;
pub mod service;
pub mod types;


pub use error::IngestionError;
pub use schema::{normalize_request, parse_transaction_date};
pub use service::IngestionService;
pub use types::{
    ExtractRow, IngestionBatch, IngestionReport, IngestionRequest, MergedRow, RawRow,
    RowDisposition, RowIssue, RowIssueReason,
};
