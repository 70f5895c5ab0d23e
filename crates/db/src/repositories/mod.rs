//! Repository abstractions for data access.
//!
//! Repositories implement the storage traits of the core crate, hiding the
//! `SeaORM` implementation details from the pipeline and the exporter.

pub mod exchange_rate;
pub mod ledger;
pub mod terminal;

pub use exchange_rate::{ExchangeRateError, ExchangeRateRepository, RateUpdate};
pub use ledger::LedgerRepository;
pub use terminal::TerminalRepository;
