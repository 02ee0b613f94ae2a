//! Shared rounding and arithmetic helpers for lease calculations.
//!
//! Money is rounded to cents and money factors to five decimal places, both
//! with half-up rounding (ties away from zero).

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for money factors (e.g. `0.00125`).
pub const MONEY_FACTOR_DP: u32 = 5;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use lease_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(466.527)), dec!(466.53));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    round_dp(value, 2)
}

/// Rounds to `dp` decimal places, ties away from zero.
pub fn round_dp(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Divides `numerator` by `denominator`, returning `None` instead of
/// panicking when the denominator is zero or the quotient overflows.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use lease_core::calculations::common::checked_ratio;
///
/// assert_eq!(checked_ratio(dec!(10), dec!(4)), Some(dec!(2.5)));
/// assert_eq!(checked_ratio(dec!(10), Decimal::ZERO), None);
/// ```
pub fn checked_ratio(
    numerator: Decimal,
    denominator: Decimal,
) -> Option<Decimal> {
    if denominator.is_zero() {
        return None;
    }
    numerator.checked_div(denominator)
}

/// Converts a percentage (e.g. `7.25`) into a rate (e.g. `0.0725`).
pub fn percent_to_rate(percent: Decimal) -> Decimal {
    percent / Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // ── round_half_up tests ──────────────────────────────────────────────

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(123.454));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(123.455));

        assert_eq!(result, dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        let result = round_half_up(dec!(-123.455));

        assert_eq!(result, dec!(-123.46));
    }

    #[test]
    fn round_half_up_handles_repeating_quotient() {
        let result = round_half_up(dec!(16795) / dec!(36));

        assert_eq!(result, dec!(466.53));
    }

    // ── round_dp tests ───────────────────────────────────────────────────

    #[test]
    fn round_dp_keeps_five_places_for_money_factor() {
        let result = round_dp(dec!(7.5) / dec!(2400), MONEY_FACTOR_DP);

        assert_eq!(result, dec!(0.00313));
    }

    // ── checked_ratio tests ──────────────────────────────────────────────

    #[test]
    fn checked_ratio_divides_normally() {
        assert_eq!(checked_ratio(dec!(26100), dec!(45000)), Some(dec!(0.58)));
    }

    #[test]
    fn checked_ratio_returns_none_for_zero_denominator() {
        assert_eq!(checked_ratio(dec!(1), dec!(0.00)), None);
    }

    // ── percent_to_rate tests ────────────────────────────────────────────

    #[test]
    fn percent_to_rate_scales_by_one_hundred() {
        assert_eq!(percent_to_rate(dec!(7.25)), dec!(0.0725));
    }
}
