//! Common types used across the application.

pub mod money;

pub use money::{CurrencyCode, MAX_MONEY, round_money};
