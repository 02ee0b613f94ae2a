use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inputs to a single lease payment calculation.
///
/// Only the first five fields are required; the rest default to zero and can
/// be set with the `with_*` builder methods.
///
/// | Field              | Default |
/// |--------------------|---------|
/// | `down_payment`     | 0       |
/// | `acquisition_fee`  | 0       |
/// | `tax_rate_percent` | 0       |
/// | `rebates`          | 0       |
/// | `upfront_fees`     | 0       |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseParams {
    /// Manufacturer's suggested retail price; basis for the residual.
    pub msrp: Decimal,
    /// Negotiated selling price (capitalized cost before adjustments).
    pub selling_price: Decimal,
    /// Residual as a percent of MSRP (e.g. `58` for 58%).
    pub residual_percent: Decimal,
    pub money_factor: Decimal,
    pub term_months: u32,
    pub down_payment: Decimal,
    pub acquisition_fee: Decimal,
    /// Sales tax applied to the monthly payment, in percent.
    pub tax_rate_percent: Decimal,
    /// Total rebates and incentives applied as a cap cost reduction.
    pub rebates: Decimal,
    /// Registration, title and similar fees paid at signing; not capitalized.
    #[serde(default)]
    pub upfront_fees: Decimal,
}

impl LeaseParams {
    pub fn new(
        msrp: Decimal,
        selling_price: Decimal,
        residual_percent: Decimal,
        money_factor: Decimal,
        term_months: u32,
    ) -> Self {
        Self {
            msrp,
            selling_price,
            residual_percent,
            money_factor,
            term_months,
            down_payment: Decimal::ZERO,
            acquisition_fee: Decimal::ZERO,
            tax_rate_percent: Decimal::ZERO,
            rebates: Decimal::ZERO,
            upfront_fees: Decimal::ZERO,
        }
    }

    pub fn with_down_payment(
        mut self,
        down_payment: Decimal,
    ) -> Self {
        self.down_payment = down_payment;
        self
    }

    pub fn with_acquisition_fee(
        mut self,
        acquisition_fee: Decimal,
    ) -> Self {
        self.acquisition_fee = acquisition_fee;
        self
    }

    pub fn with_tax_rate_percent(
        mut self,
        tax_rate_percent: Decimal,
    ) -> Self {
        self.tax_rate_percent = tax_rate_percent;
        self
    }

    pub fn with_rebates(
        mut self,
        rebates: Decimal,
    ) -> Self {
        self.rebates = rebates;
        self
    }

    pub fn with_upfront_fees(
        mut self,
        upfront_fees: Decimal,
    ) -> Self {
        self.upfront_fees = upfront_fees;
        self
    }
}

/// Conditions that make a breakdown unusable or suspicious. The calculation
/// still returns finite numbers; callers decide how to report these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaseWarning {
    /// `term_months` was zero; every per-month figure is zero.
    ZeroTerm,
    /// Residual value exceeds the adjusted cap cost.
    NegativeDepreciation,
    /// The total monthly payment came out zero or negative.
    NonPositivePayment,
    /// An intermediate value left the decimal range; every figure is zero.
    Overflow,
}

/// Monthly payment breakdown. Every monetary field is rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeaseBreakdown {
    pub residual_value: Decimal,
    pub adjusted_cap_cost: Decimal,
    /// Adjusted cap cost minus residual value over the whole term.
    pub total_depreciation: Decimal,
    /// Depreciation portion of each monthly payment.
    pub monthly_depreciation: Decimal,
    /// Finance (rent) charge portion of each monthly payment.
    pub monthly_finance_charge: Decimal,
    pub base_payment: Decimal,
    pub monthly_tax: Decimal,
    /// Always `base_payment + monthly_tax`.
    pub total_monthly_payment: Decimal,
    pub total_lease_cost: Decimal,
    /// Down payment plus the first month's payment plus upfront fees.
    pub total_drive_off: Decimal,
    pub warnings: Vec<LeaseWarning>,
}

impl LeaseBreakdown {
    pub fn is_degenerate(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has_warning(
        &self,
        warning: LeaseWarning,
    ) -> bool {
        self.warnings.contains(&warning)
    }
}
