//! Exchange rate freshness gate.

use chrono::NaiveDate;
use posrecon_shared::CurrencyCode;

use super::exchange::RateSnapshot;

/// Returns the required currencies that are missing or not set on `date`.
///
/// Order follows `required`, so error messages are stable.
#[must_use]
pub fn stale_currencies(
    required: &[CurrencyCode],
    rates: &RateSnapshot,
    date: NaiveDate,
) -> Vec<CurrencyCode> {
    required
        .iter()
        .copied()
        .filter(|code| !rates.get(*code).is_some_and(|r| r.is_fresh_for(date)))
        .collect()
}
