//! Property-based tests for currency operations.
//!
//! - Conversion result is always rounded to cents
//! - Converting back with the same rate stays within half a cent per unit of rate
//! - Freshness gate never accepts a rate from another day

use chrono::{Duration, NaiveDate};
use posrecon_shared::CurrencyCode;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::conversion::to_home_currency;
use super::exchange::{ExchangeRate, RateSnapshot};
use super::freshness::stale_currencies;

/// Strategy to generate non-negative amounts (0.00 to 10,000,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate positive exchange rates (0.0001 to 10000.0000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

proptest! {
    #[test]
    fn prop_conversion_has_at_most_two_decimals(
        amount in amount(),
        rate in positive_rate(),
    ) {
        let converted = to_home_currency(CurrencyCode::Vc, amount, rate).unwrap();
        prop_assert!(converted.scale() <= 2);
        prop_assert_eq!(converted, converted.round_dp(2));
    }

    #[test]
    fn prop_conversion_error_is_bounded(
        amount in amount(),
        rate in positive_rate(),
    ) {
        let converted = to_home_currency(CurrencyCode::Mc, amount, rate).unwrap();
        let exact = amount / rate;
        prop_assert!((converted - exact).abs() <= Decimal::new(5, 3));
    }

    #[test]
    fn prop_rate_from_other_day_is_stale(offset in 1i64..365, before in any::<bool>()) {
        let target = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let shift = Duration::days(offset);
        let set_on = if before { target - shift } else { target + shift };
        let rates = RateSnapshot::from_rates([ExchangeRate::new(
            CurrencyCode::Cup,
            Decimal::ONE,
            set_on,
        )]);
        prop_assert_eq!(
            stale_currencies(&[CurrencyCode::Cup], &rates, target),
            vec![CurrencyCode::Cup]
        );
    }
}
