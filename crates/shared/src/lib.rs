//! Shared types, errors, and configuration for the POS reconciliation backend.
//!
//! This crate provides common types used across all other crates:
//! - Currency codes and money rounding with decimal precision
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use types::{CurrencyCode, MAX_MONEY, round_money};
