//! Currency conversion logic.
//!
//! CRITICAL: Rounding strategy for home-currency equivalents:
//! - Divide the POS amount by the currency's rate in full decimal precision
//! - Round once, to cents, midpoints away from zero
//! - Store both the source amount and the converted amount

use posrecon_shared::{CurrencyCode, MAX_MONEY, round_money};
use rust_decimal::Decimal;
use thiserror::Error;

/// A conversion that cannot produce a finite home-currency amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Rate is zero or negative.
    #[error("Exchange rate for {currency} must be positive, got {rate}")]
    NonPositiveRate {
        /// Currency being converted.
        currency: CurrencyCode,
        /// Offending rate.
        rate: Decimal,
    },

    /// Quotient does not fit in a decimal.
    #[error("Converting {amount} {currency} overflowed")]
    Overflow {
        /// Currency being converted.
        currency: CurrencyCode,
        /// Source amount.
        amount: Decimal,
    },

    /// Running grand total would exceed the storable range.
    #[error("Adding {amount} to grand total {total} overflowed")]
    TotalOverflow {
        /// Total before the addition.
        total: Decimal,
        /// Amount being added.
        amount: Decimal,
    },
}

/// Converts a POS amount into the home currency: `round2(amount / rate)`.
///
/// # Errors
///
/// Returns an error for a non-positive rate, or for a quotient outside the
/// stored money range.
pub fn to_home_currency(
    currency: CurrencyCode,
    amount: Decimal,
    rate: Decimal,
) -> Result<Decimal, ConversionError> {
    if rate <= Decimal::ZERO {
        return Err(ConversionError::NonPositiveRate { currency, rate });
    }

    amount
        .checked_div(rate)
        .map(round_money)
        .filter(|home| *home < MAX_MONEY)
        .ok_or(ConversionError::Overflow { currency, amount })
}
