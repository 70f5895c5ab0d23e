//! Exchange rate types and logic.

use std::collections::HashMap;

use chrono::NaiveDate;
use posrecon_shared::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Home-currency exchange rate for one card currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Currency the POS amounts are denominated in.
    pub currency: CurrencyCode,
    /// Source units per one home-currency unit.
    pub rate: Decimal,
    /// Calendar day the rate was last set.
    pub last_updated: NaiveDate,
}

impl ExchangeRate {
    /// Creates a new exchange rate.
    #[must_use]
    pub const fn new(currency: CurrencyCode, rate: Decimal, last_updated: NaiveDate) -> Self {
        Self {
            currency,
            rate,
            last_updated,
        }
    }

    /// A rate is usable for `date` only when it was set on exactly that day.
    #[must_use]
    pub fn is_fresh_for(&self, date: NaiveDate) -> bool {
        self.last_updated == date
    }
}

/// Rates loaded once per batch, keyed by currency.
#[derive(Debug, Clone, Default)]
pub struct RateSnapshot {
    rates: HashMap<CurrencyCode, ExchangeRate>,
}

impl RateSnapshot {
    /// Builds a snapshot; a later entry for the same currency wins.
    #[must_use]
    pub fn from_rates(rates: impl IntoIterator<Item = ExchangeRate>) -> Self {
        Self {
            rates: rates.into_iter().map(|r| (r.currency, r)).collect(),
        }
    }

    /// Returns the full rate record for a currency.
    #[must_use]
    pub fn get(&self, currency: CurrencyCode) -> Option<&ExchangeRate> {
        self.rates.get(&currency)
    }

    /// Returns the numeric rate for a currency.
    #[must_use]
    pub fn rate(&self, currency: CurrencyCode) -> Option<Decimal> {
        self.rates.get(&currency).map(|r| r.rate)
    }
}
