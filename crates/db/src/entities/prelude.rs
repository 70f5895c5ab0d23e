//! Entity re-exports.

pub use super::branches::Entity as Branches;
pub use super::currencies::Entity as Currencies;
pub use super::districts::Entity as Districts;
pub use super::report_batches::Entity as ReportBatches;
pub use super::terminals::Entity as Terminals;
pub use super::transaction_history::Entity as TransactionHistory;
