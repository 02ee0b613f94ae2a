//! Conversions between lease-industry quantities.

use rust_decimal::Decimal;

use crate::calculations::common::{MONEY_FACTOR_DP, checked_ratio, round_dp, round_half_up};

/// Multiplier relating a money factor to an annual percentage rate.
pub const APR_FACTOR: Decimal = Decimal::from_parts(2400, 0, 0, false, 0);

/// APR (percent, 2 dp) equivalent to a money factor. Zero when the product
/// leaves the decimal range.
///
/// ```
/// use rust_decimal_macros::dec;
/// use lease_core::calculations::money_factor_to_apr;
///
/// assert_eq!(money_factor_to_apr(dec!(0.00125)), dec!(3.00));
/// ```
pub fn money_factor_to_apr(money_factor: Decimal) -> Decimal {
    money_factor
        .checked_mul(APR_FACTOR)
        .map_or(Decimal::ZERO, round_half_up)
}

/// Money factor (5 dp) equivalent to an APR given in percent.
///
/// ```
/// use rust_decimal_macros::dec;
/// use lease_core::calculations::apr_to_money_factor;
///
/// assert_eq!(apr_to_money_factor(dec!(3.0)), dec!(0.00125));
/// ```
pub fn apr_to_money_factor(apr: Decimal) -> Decimal {
    apr.checked_div(APR_FACTOR)
        .map_or(Decimal::ZERO, |mf| round_dp(mf, MONEY_FACTOR_DP))
}

/// Residual amount expressed as a percent of MSRP (2 dp). Zero when MSRP is zero.
pub fn residual_percentage(
    msrp: Decimal,
    residual_amount: Decimal,
) -> Decimal {
    as_percent(checked_ratio(residual_amount, msrp)).unwrap_or(Decimal::ZERO)
}

/// Selling price as a percent of MSRP (2 dp), or `None` when MSRP is not positive.
pub fn cap_cost_percentage(
    msrp: Decimal,
    selling_price: Decimal,
) -> Option<Decimal> {
    if msrp <= Decimal::ZERO {
        return None;
    }
    as_percent(checked_ratio(selling_price, msrp))
}

fn as_percent(ratio: Option<Decimal>) -> Option<Decimal> {
    ratio
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .map(round_half_up)
}

/// Total out-of-pocket over the lease: payments plus down payment plus fees.
/// Saturates at the decimal range.
pub fn calculate_total_lease_cost(
    monthly_payment: Decimal,
    term_months: u32,
    down_payment: Decimal,
    fees: Decimal,
) -> Decimal {
    round_half_up(
        monthly_payment
            .saturating_mul(Decimal::from(term_months))
            .saturating_add(down_payment)
            .saturating_add(fees),
    )
}
