//! Core business logic for the POS reconciliation backend.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached only through the traits in [`repository`].
//!
//! # Modules
//!
//! - `currency` - Exchange rates, freshness gating and home-currency conversion
//! - `registry` - Terminal snapshots and once-per-day grand total accumulation
//! - `ledger` - Transaction history records and query filters
//! - `repository` - Storage seams implemented by the db crate
//! - `ingestion` - Daily extract ingestion pipeline
//! - `reports` - Read-only export projections

pub mod currency;
pub mod ingestion;
pub mod ledger;
pub mod registry;
pub mod reports;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;
