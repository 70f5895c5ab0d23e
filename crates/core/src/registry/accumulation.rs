//! Once-per-day grand total accumulation.

use chrono::NaiveDate;
use posrecon_shared::{MAX_MONEY, round_money};
use rust_decimal::Decimal;

use super::types::TerminalSnapshot;
use crate::currency::ConversionError;

/// Outcome of applying one day's amount to a terminal's running total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accumulation {
    /// The total must be raised to `new_total` and dated `as_of`.
    Bump {
        /// Total before this day.
        previous: Decimal,
        /// Total including this day.
        new_total: Decimal,
        /// Day being accumulated.
        as_of: NaiveDate,
    },
    /// The terminal was already bumped for this day; total stays as is.
    AlreadyApplied {
        /// Unchanged total.
        total: Decimal,
    },
}

impl Accumulation {
    /// Total the terminal carries after this decision.
    #[must_use]
    pub const fn resulting_total(&self) -> Decimal {
        match self {
            Self::Bump { new_total, .. } => *new_total,
            Self::AlreadyApplied { total } => *total,
        }
    }
}

/// Decides whether `amount` is added to the terminal's total for `date`.
///
/// The key is calendar-date equality on `grand_total_updated_at`; a terminal
/// last bumped on any other day (or never) is bumped.
///
/// # Errors
///
/// Returns `ConversionError::TotalOverflow` when the new total does not fit
/// the stored money range.
pub fn accumulate(
    terminal: &TerminalSnapshot,
    amount: Decimal,
    date: NaiveDate,
) -> Result<Accumulation, ConversionError> {
    if terminal.grand_total_updated_at == Some(date) {
        return Ok(Accumulation::AlreadyApplied {
            total: terminal.grand_total,
        });
    }

    let new_total = terminal
        .grand_total
        .checked_add(amount)
        .map(round_money)
        .filter(|total| *total < MAX_MONEY)
        .ok_or(ConversionError::TotalOverflow {
            total: terminal.grand_total,
            amount,
        })?;

    Ok(Accumulation::Bump {
        previous: terminal.grand_total,
        new_total,
        as_of: date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn terminal(total: Decimal, updated: Option<NaiveDate>) -> TerminalSnapshot {
        TerminalSnapshot {
            code: "T1".to_string(),
            display_name: None,
            branch_name: None,
            district_name: None,
            is_retired: false,
            grand_total: total,
            grand_total_updated_at: updated,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn test_never_updated_terminal_is_bumped() {
        let decision = accumulate(&terminal(dec!(100.00), None), dec!(50.00), day(10));
        assert_eq!(
            decision,
            Ok(Accumulation::Bump {
                previous: dec!(100.00),
                new_total: dec!(150.00),
                as_of: day(10),
            })
        );
    }

    #[test]
    fn test_same_day_is_not_bumped_again() {
        let decision =
            accumulate(&terminal(dec!(150.00), Some(day(10))), dec!(30.00), day(10)).unwrap();
        assert_eq!(decision, Accumulation::AlreadyApplied { total: dec!(150.00) });
        assert_eq!(decision.resulting_total(), dec!(150.00));
    }

    #[test]
    fn test_other_day_is_bumped() {
        let decision =
            accumulate(&terminal(dec!(150.00), Some(day(11))), dec!(30.00), day(10)).unwrap();
        assert_eq!(decision.resulting_total(), dec!(180.00));
    }

    #[test]
    fn test_sum_is_rounded_to_cents() {
        let decision = accumulate(&terminal(dec!(0.10), None), dec!(0.205), day(10)).unwrap();
        assert_eq!(decision.resulting_total(), dec!(0.31));
    }

    #[test]
    fn test_decimal_overflow_is_an_error() {
        let decision = accumulate(&terminal(dec!(1.00), None), Decimal::MAX, day(10));
        assert_eq!(
            decision,
            Err(ConversionError::TotalOverflow {
                total: dec!(1.00),
                amount: Decimal::MAX,
            })
        );
    }

    #[test]
    fn test_total_beyond_storable_range_is_an_error() {
        let near_limit = MAX_MONEY - dec!(0.01);
        let decision = accumulate(&terminal(near_limit, None), dec!(0.01), day(10));
        assert!(matches!(decision, Err(ConversionError::TotalOverflow { .. })));

        let fits = accumulate(&terminal(near_limit - dec!(0.01), None), dec!(0.01), day(10));
        assert_eq!(fits.unwrap().resulting_total(), near_limit);
    }

    #[test]
    fn test_same_day_skips_overflow_check() {
        let decision = accumulate(&terminal(dec!(5.00), Some(day(10))), Decimal::MAX, day(10));
        assert_eq!(decision, Ok(Accumulation::AlreadyApplied { total: dec!(5.00) }));
    }

    proptest! {
        #[test]
        fn prop_bump_adds_exactly_once(
            start in 0i64..1_000_000_000,
            amount in 0i64..100_000_000,
        ) {
            let start = Decimal::new(start, 2);
            let amount = Decimal::new(amount, 2);
            let first = accumulate(&terminal(start, None), amount, day(10)).unwrap();
            prop_assert_eq!(first.resulting_total(), start + amount);

            let after = terminal(first.resulting_total(), Some(day(10)));
            let second = accumulate(&after, amount, day(10)).unwrap();
            prop_assert_eq!(second.resulting_total(), start + amount);
        }
    }
}
