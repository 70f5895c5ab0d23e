//! Exchange rates, freshness gating and home-currency conversion.

pub mod conversion;
pub mod exchange;
pub mod freshness;

#[cfg(test)]
mod props;

pub use conversion::{ConversionError, to_home_currency};
pub use exchange::{ExchangeRate, RateSnapshot};
pub use freshness::stale_currencies;
