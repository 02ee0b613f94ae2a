//! Monthly lease payment calculation.
//!
//! # Calculation steps
//!
//! | Step | Quantity | Formula |
//! |------|----------|---------|
//! | 1 | Residual value        | MSRP × residual% / 100 |
//! | 2 | Adjusted cap cost     | selling price + acquisition fee − down payment − rebates |
//! | 3 | Depreciation          | adjusted cap cost − residual value |
//! | 3a | Monthly depreciation | depreciation / term |
//! | 4 | Monthly finance charge | (adjusted cap cost + residual value) × money factor |
//! | 5 | Base payment          | monthly depreciation + monthly finance charge |
//! | 6 | Monthly tax           | base payment × tax% / 100 |
//! | 7 | Total monthly payment | base payment + monthly tax |
//! | 7a | Due at signing       | down payment + upfront fees + total monthly payment |
//! | 8 | Total lease cost      | total monthly payment × term + down payment |
//!
//! Intermediate values keep full precision; rounding to cents happens once,
//! when the [`LeaseBreakdown`] is built.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use lease_core::calculations::calculate_lease_payment;
//! use lease_core::LeaseParams;
//!
//! let params = LeaseParams::new(dec!(45000), dec!(42000), dec!(58), dec!(0.00125), 36)
//!     .with_acquisition_fee(dec!(895))
//!     .with_tax_rate_percent(dec!(7.25));
//!
//! let breakdown = calculate_lease_payment(&params);
//!
//! assert_eq!(breakdown.base_payment, dec!(552.77));
//! assert_eq!(breakdown.total_monthly_payment, dec!(592.85));
//! ```

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::common::{percent_to_rate, round_half_up};
use crate::models::{LeaseBreakdown, LeaseParams, LeaseWarning};

/// Computes the monthly payment breakdown for `params`.
///
/// The function is total: out-of-range inputs are not rejected. A zero term
/// yields per-month figures of zero plus [`LeaseWarning::ZeroTerm`]; negative
/// depreciation and non-positive payments are flagged rather than clamped.
/// Inputs whose arithmetic leaves the `Decimal` range produce an all-zero
/// breakdown carrying [`LeaseWarning::Overflow`].
pub fn calculate_lease_payment(params: &LeaseParams) -> LeaseBreakdown {
    checked_breakdown(params).unwrap_or_else(|| {
        warn!(msrp = %params.msrp, selling_price = %params.selling_price, "lease arithmetic overflowed");
        LeaseBreakdown {
            warnings: vec![LeaseWarning::Overflow],
            ..LeaseBreakdown::default()
        }
    })
}

/// `None` as soon as any step overflows.
fn checked_breakdown(params: &LeaseParams) -> Option<LeaseBreakdown> {
    let residual_value = residual_value(params.msrp, params.residual_percent)?;
    let adjusted_cap_cost = adjusted_cap_cost(params)?;
    let depreciation = adjusted_cap_cost.checked_sub(residual_value)?;
    let paid_at_signing = params.down_payment.checked_add(params.upfront_fees)?;

    let mut warnings = Vec::new();
    if depreciation < Decimal::ZERO {
        warnings.push(LeaseWarning::NegativeDepreciation);
    }

    if params.term_months == 0 {
        debug!("lease term is zero; returning zero monthly figures");
        warnings.push(LeaseWarning::ZeroTerm);
        return Some(LeaseBreakdown {
            residual_value: round_half_up(residual_value),
            adjusted_cap_cost: round_half_up(adjusted_cap_cost),
            total_depreciation: round_half_up(depreciation),
            total_lease_cost: round_half_up(params.down_payment),
            total_drive_off: round_half_up(paid_at_signing),
            warnings,
            ..LeaseBreakdown::default()
        });
    }

    let term = Decimal::from(params.term_months);
    let monthly_depreciation = depreciation.checked_div(term)?;
    let monthly_finance_charge = adjusted_cap_cost
        .checked_add(residual_value)?
        .checked_mul(params.money_factor)?;
    let base_payment = monthly_depreciation.checked_add(monthly_finance_charge)?;
    let monthly_tax = base_payment.checked_mul(percent_to_rate(params.tax_rate_percent))?;
    let total_monthly_payment = base_payment.checked_add(monthly_tax)?;
    let total_lease_cost = total_monthly_payment
        .checked_mul(term)?
        .checked_add(params.down_payment)?;
    let total_drive_off = paid_at_signing.checked_add(total_monthly_payment)?;

    let base_payment_out = round_half_up(base_payment);
    let monthly_tax_out = round_half_up(monthly_tax);
    // Sum the rounded parts so the displayed total always equals base + tax.
    let total_monthly_out = base_payment_out.checked_add(monthly_tax_out)?;

    if total_monthly_out <= Decimal::ZERO {
        warnings.push(LeaseWarning::NonPositivePayment);
    }

    Some(LeaseBreakdown {
        residual_value: round_half_up(residual_value),
        adjusted_cap_cost: round_half_up(adjusted_cap_cost),
        total_depreciation: round_half_up(depreciation),
        monthly_depreciation: round_half_up(monthly_depreciation),
        monthly_finance_charge: round_half_up(monthly_finance_charge),
        base_payment: base_payment_out,
        monthly_tax: monthly_tax_out,
        total_monthly_payment: total_monthly_out,
        total_lease_cost: round_half_up(total_lease_cost),
        total_drive_off: round_half_up(total_drive_off),
        warnings,
    })
}

/// Residual value in dollars.
fn residual_value(
    msrp: Decimal,
    residual_percent: Decimal,
) -> Option<Decimal> {
    msrp.checked_mul(percent_to_rate(residual_percent))
}

/// Selling price plus capitalized fees, less cap cost reductions.
fn adjusted_cap_cost(params: &LeaseParams) -> Option<Decimal> {
    params
        .selling_price
        .checked_add(params.acquisition_fee)?
        .checked_sub(params.down_payment)?
        .checked_sub(params.rebates)
}
