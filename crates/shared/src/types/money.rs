//! Currency codes and money rounding.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal` rounded to cents.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places kept for every stored amount.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Exclusive upper bound of a stored cents amount (`NUMERIC(20,2)`).
pub const MAX_MONEY: Decimal = Decimal::from_parts(0xA764_0000, 0x0DE0_B6B3, 0, false, 0); // 1_000_000_000_000_000_000

/// Rounds an amount to cents, midpoints away from zero.
///
/// This is the `round(x * 100) / 100` rule the reports have always used,
/// done in decimal so repeated accumulation never drifts.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Foreign card currencies that POS totals are converted from.
///
/// Each code has one home-currency rate in the exchange rate store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    /// Visa card settlement currency.
    Vc,
    /// Mastercard settlement currency.
    Mc,
    /// UnionPay settlement currency.
    Cup,
}

impl CurrencyCode {
    /// Every code the ingestion pipeline requires a fresh rate for.
    pub const ALL: [Self; 3] = [Self::Vc, Self::Mc, Self::Cup];

    /// Returns the stored code string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vc => "VC",
            Self::Mc => "MC",
            Self::Cup => "CUP",
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VC" => Ok(Self::Vc),
            "MC" => Ok(Self::Mc),
            "CUP" => Ok(Self::Cup),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}
