//! `SeaORM` entities.

pub mod prelude;

pub mod branches;
pub mod currencies;
pub mod districts;
pub mod report_batches;
pub mod terminals;
pub mod transaction_history;
