//! The lease form as a value driven by explicit events.
//!
//! Each [`FormEvent`] carries raw user text. [`LeaseForm::apply`] stores it and
//! refreshes the fields that depend on it from the reference data, the same
//! way an interactive page would on `change`. Derived fields stay editable: a
//! later event for that field simply overwrites the derived value.

use std::str::FromStr;

use lease_core::calculations::{
    LeaseInputs, apr_to_money_factor, cap_cost_percentage, money_factor_to_apr,
    validate_lease_inputs,
};
use lease_core::{
    CreditTier, LeaseBreakdown, LeaseParams, MileageAllowance, calculate_lease_payment,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::estimator::Estimator;
use crate::utils::{parse_decimal, parse_optional_decimal};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    MakeSelected(String),
    ModelEntered(String),
    YearEntered(String),
    VinEntered(String),
    ZipEntered(String),
    StateSelected(String),
    TermSelected(String),
    MileageSelected(String),
    TierSelected(String),
    MsrpEntered(String),
    SellingPriceEntered(String),
    DownPaymentEntered(String),
    RebatesEntered(String),
    RegistrationFeesEntered(String),
    MoneyFactorEntered(String),
    AprEntered(String),
}

/// Form state. Every field holds text exactly as it would appear on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaseForm {
    // Vehicle
    pub make: String,
    pub model: String,
    pub year: String,
    pub vin: String,

    // Location
    pub zip: String,
    pub state: String,
    pub tax_rate: String,

    // Lease terms
    pub term: String,
    pub mileage: String,
    pub tier: String,
    pub residual_percent: String,
    pub money_factor: String,
    pub apr: String,

    // Pricing
    pub msrp: String,
    pub selling_price: String,
    pub cap_cost_percent: String,
    pub down_payment: String,
    pub acquisition_fee: String,
    pub disposition_fee: String,
    /// State registration and title charges, due at signing.
    pub registration_fees: String,

    /// Federal credit plus state new-vehicle rebate; applied as a cap cost
    /// reduction.
    pub rebates: String,
    pub federal_credit: String,
    pub state_new_credit: String,
    pub state_used_credit: String,
    pub state_program: String,

    pub errors: Vec<String>,
}

impl LeaseForm {
    /// A blank form carrying the estimator's default tier and mileage.
    pub fn new(estimator: &Estimator) -> Self {
        Self {
            tier: estimator.default_tier.as_str().to_string(),
            mileage: estimator.default_mileage.to_string(),
            ..Default::default()
        }
    }

    pub fn apply(
        &mut self,
        event: FormEvent,
        estimator: &Estimator,
    ) {
        debug!(?event, "form event");
        match event {
            FormEvent::MakeSelected(make) => {
                self.make = make;
                self.update_fees(estimator);
                self.update_money_factor(estimator);
                self.update_credits(estimator);
            }
            FormEvent::ModelEntered(model) => {
                self.model = model;
                self.update_credits(estimator);
            }
            FormEvent::YearEntered(year) => {
                self.year = year;
                self.update_money_factor(estimator);
                self.update_credits(estimator);
            }
            FormEvent::VinEntered(vin) => {
                self.vin = vin;
                self.update_from_vin(estimator);
            }
            FormEvent::ZipEntered(zip) => {
                self.zip = zip;
                if let Some(state) = estimator.tables.zip_to_state(&self.zip) {
                    self.state = state;
                    self.update_tax(estimator);
                    self.update_credits(estimator);
                }
                self.update_registration_fees(estimator);
            }
            FormEvent::StateSelected(state) => {
                self.state = state;
                self.update_tax(estimator);
                self.update_credits(estimator);
                self.update_registration_fees(estimator);
            }
            FormEvent::TermSelected(term) => {
                self.term = term;
                self.update_residual(estimator);
            }
            FormEvent::MileageSelected(mileage) => {
                self.mileage = mileage;
                self.update_residual(estimator);
            }
            FormEvent::TierSelected(tier) => {
                self.tier = tier;
                self.update_money_factor(estimator);
            }
            FormEvent::MsrpEntered(msrp) => {
                self.msrp = msrp;
                self.update_cap_cost_percent();
                self.update_registration_fees(estimator);
            }
            FormEvent::SellingPriceEntered(price) => {
                self.selling_price = price;
                self.update_cap_cost_percent();
            }
            FormEvent::DownPaymentEntered(down) => self.down_payment = down,
            FormEvent::RebatesEntered(rebates) => self.rebates = rebates,
            FormEvent::RegistrationFeesEntered(fees) => self.registration_fees = fees,
            FormEvent::MoneyFactorEntered(mf) => {
                self.money_factor = mf;
                if let Some(mf) = parse_optional_decimal(&self.money_factor) {
                    self.apr = money_factor_to_apr(mf).to_string();
                }
            }
            FormEvent::AprEntered(apr) => {
                self.apr = apr;
                if let Some(apr) = parse_optional_decimal(&self.apr) {
                    self.money_factor = apr_to_money_factor(apr).to_string();
                }
            }
        }
    }

    // ── dependent-field updates ──────────────────────────────────────────

    fn update_fees(
        &mut self,
        estimator: &Estimator,
    ) {
        if let Some(fee) = estimator.tables.fees(&self.make) {
            self.acquisition_fee = fee.acquisition_fee.to_string();
            self.disposition_fee = fee.disposition_fee.to_string();
        }
    }

    fn update_money_factor(
        &mut self,
        estimator: &Estimator,
    ) {
        let (Some(year), Some(tier)) = (self.model_year(), CreditTier::parse(&self.tier)) else {
            return;
        };
        if let Some(mf) = estimator.tables.money_factor(&self.make, year, tier) {
            self.money_factor = mf.to_string();
            self.apr = money_factor_to_apr(mf).to_string();
        }
    }

    /// Only overwrites the residual when the matrix has the cell.
    fn update_residual(
        &mut self,
        estimator: &Estimator,
    ) {
        let (Some(term), Some(mileage)) = (self.term_months(), MileageAllowance::parse(&self.mileage))
        else {
            return;
        };
        if let Some(percent) = estimator.tables.residual_percent(term, mileage) {
            self.residual_percent = percent.to_string();
        }
    }

    /// Leaves the rate untouched for unknown states.
    fn update_tax(
        &mut self,
        estimator: &Estimator,
    ) {
        if let Some(state) = estimator.tables.state(&self.state) {
            self.tax_rate = state.tax_rate_percent.to_string();
        }
    }

    /// Needs make, model, year and state before it resolves anything.
    fn update_credits(
        &mut self,
        estimator: &Estimator,
    ) {
        let Some(year) = self.model_year() else {
            return;
        };
        if self.make.trim().is_empty() || self.model.trim().is_empty() || self.state.trim().is_empty() {
            return;
        }

        let credits = estimator.credits();
        let federal = credits.federal_credit(&self.make, &self.model, year);
        let state = credits.state_credit(&self.state);

        self.federal_credit = federal.to_string();
        self.state_new_credit = state.new_vehicle.to_string();
        self.state_used_credit = state.used_vehicle.to_string();
        self.state_program = state.program.unwrap_or_default();
        self.rebates = federal.saturating_add(state.new_vehicle).to_string();
    }

    /// Charged on MSRP. Leaves the field untouched for states without fee data.
    fn update_registration_fees(
        &mut self,
        estimator: &Estimator,
    ) {
        let Some(msrp) = parse_optional_decimal(&self.msrp) else {
            return;
        };
        if estimator.tables.state_fees(&self.state).is_none() {
            return;
        }
        self.registration_fees = estimator
            .tables
            .registration_fees(&self.state, msrp, &self.zip)
            .to_string();
    }

    fn update_cap_cost_percent(&mut self) {
        let (Some(msrp), Some(price)) = (
            parse_optional_decimal(&self.msrp),
            parse_optional_decimal(&self.selling_price),
        ) else {
            return;
        };
        if let Some(percent) = cap_cost_percentage(msrp, price) {
            self.cap_cost_percent = percent.to_string();
        }
    }

    fn update_from_vin(
        &mut self,
        estimator: &Estimator,
    ) {
        let Some(decoded) = estimator.tables.decode_wmi(&self.vin) else {
            debug!(vin = %self.vin, "VIN not decodable; leaving vehicle fields");
            return;
        };
        if let Some(make) = decoded.make {
            self.make = make;
            self.update_fees(estimator);
        }
        if let Some(year) = decoded.model_year {
            self.year = year.to_string();
        }
        self.update_money_factor(estimator);
        self.update_credits(estimator);
    }

    // ── parsing ──────────────────────────────────────────────────────────

    fn model_year(&self) -> Option<i32> {
        self.year.trim().parse().ok().filter(|y| *y > 0)
    }

    fn term_months(&self) -> Option<u32> {
        self.term.trim().parse().ok()
    }

    /// Checks every field the calculation needs. Errors are user-facing and
    /// stored on the form.
    pub fn validate(&mut self) -> Result<LeaseParams, Vec<String>> {
        self.errors.clear();

        let msrp = self.parse_decimal_required("MSRP", &self.msrp.clone());
        let selling_price = self.parse_decimal_required("Selling price", &self.selling_price.clone());
        let residual_percent =
            self.parse_decimal_required("Residual percent", &self.residual_percent.clone());
        let money_factor = self.parse_decimal_required("Money factor", &self.money_factor.clone());
        let down_payment = self.parse_decimal_optional("Down payment", &self.down_payment.clone());
        let acquisition_fee =
            self.parse_decimal_optional("Acquisition fee", &self.acquisition_fee.clone());
        let tax_rate = self.parse_decimal_optional("Tax rate", &self.tax_rate.clone());
        let rebates = self.parse_decimal_optional("Rebates", &self.rebates.clone());
        let registration_fees =
            self.parse_decimal_optional("Registration fees", &self.registration_fees.clone());

        let inputs = LeaseInputs {
            msrp: msrp.unwrap_or(Decimal::ZERO),
            selling_price: selling_price.unwrap_or(Decimal::ZERO),
            term_months: self.term_months(),
            mileage: MileageAllowance::parse(&self.mileage),
            make: Some(self.make.clone()).filter(|m| !m.trim().is_empty()),
        };
        if let Err(messages) = validate_lease_inputs(&inputs) {
            for message in messages {
                if !self.errors.contains(&message) {
                    self.errors.push(message);
                }
            }
        }

        if !self.errors.is_empty() {
            return Err(self.errors.clone());
        }

        let (Some(msrp), Some(selling_price), Some(residual_percent), Some(money_factor), Some(term)) =
            (msrp, selling_price, residual_percent, money_factor, inputs.term_months)
        else {
            return Err(vec!["Form is incomplete".to_string()]);
        };

        Ok(
            LeaseParams::new(msrp, selling_price, residual_percent, money_factor, term)
                .with_down_payment(down_payment)
                .with_acquisition_fee(acquisition_fee)
                .with_tax_rate_percent(tax_rate)
                .with_rebates(rebates)
                .with_upfront_fees(registration_fees),
        )
    }

    /// Fills any still-empty looked-up field, validates, then calculates.
    pub fn quote(
        &mut self,
        estimator: &Estimator,
    ) -> Result<LeaseBreakdown, Vec<String>> {
        if self.acquisition_fee.trim().is_empty() {
            self.update_fees(estimator);
        }
        if self.residual_percent.trim().is_empty() {
            self.update_residual(estimator);
        }
        if self.money_factor.trim().is_empty() {
            self.update_money_factor(estimator);
        }
        if self.tax_rate.trim().is_empty() {
            self.update_tax(estimator);
        }
        if self.registration_fees.trim().is_empty() {
            self.update_registration_fees(estimator);
        }
        let params = self.validate()?;
        Ok(calculate_lease_payment(&params))
    }

    fn parse_decimal_required(
        &mut self,
        field: &str,
        value: &str,
    ) -> Option<Decimal> {
        if value.trim().is_empty() {
            self.errors.push(format!("{field} is required"));
            return None;
        }
        match parse_decimal(value) {
            Ok(v) => Some(v),
            Err(_) => {
                self.errors.push(format!("{field} must be a valid number"));
                None
            }
        }
    }

    fn parse_decimal_optional(
        &mut self,
        field: &str,
        value: &str,
    ) -> Decimal {
        match parse_decimal(value) {
            Ok(v) if v >= Decimal::ZERO => v,
            Ok(_) => {
                self.errors.push(format!("{field} cannot be negative"));
                Decimal::ZERO
            }
            Err(_) => {
                self.errors.push(format!("{field} must be a valid number"));
                Decimal::ZERO
            }
        }
    }
}

impl FromStr for FormEvent {
    type Err = String;

    /// Parses `field=value`, as given on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected field=value, got '{s}'"))?;
        let value = value.to_string();
        let event = match field.trim().to_ascii_lowercase().as_str() {
            "make" => FormEvent::MakeSelected(value),
            "model" => FormEvent::ModelEntered(value),
            "year" => FormEvent::YearEntered(value),
            "vin" => FormEvent::VinEntered(value),
            "zip" => FormEvent::ZipEntered(value),
            "state" => FormEvent::StateSelected(value),
            "term" => FormEvent::TermSelected(value),
            "mileage" => FormEvent::MileageSelected(value),
            "tier" => FormEvent::TierSelected(value),
            "msrp" => FormEvent::MsrpEntered(value),
            "price" | "selling_price" => FormEvent::SellingPriceEntered(value),
            "down" | "down_payment" => FormEvent::DownPaymentEntered(value),
            "rebates" => FormEvent::RebatesEntered(value),
            "fees" | "registration_fees" => FormEvent::RegistrationFeesEntered(value),
            "mf" | "money_factor" => FormEvent::MoneyFactorEntered(value),
            "apr" => FormEvent::AprEntered(value),
            other => return Err(format!("unknown form field '{other}'")),
        };
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn event_parses_from_field_value_pair() {
        assert_eq!(
            "make=BMW".parse::<FormEvent>(),
            Ok(FormEvent::MakeSelected("BMW".to_string()))
        );
        assert_eq!(
            "Price=42,000".parse::<FormEvent>(),
            Ok(FormEvent::SellingPriceEntered("42,000".to_string()))
        );
    }

    #[test]
    fn event_parse_rejects_unknown_field_and_missing_value() {
        assert!("colour=red".parse::<FormEvent>().is_err());
        assert!("make".parse::<FormEvent>().is_err());
    }

    #[test]
    fn validate_reports_missing_required_fields() {
        let mut form = LeaseForm::default();

        let errors = form.validate().unwrap_err();

        assert!(errors.contains(&"MSRP is required".to_string()));
        assert!(errors.contains(&"Money factor is required".to_string()));
        assert!(errors.contains(&"Vehicle make is required".to_string()));
        assert!(errors.contains(&"Mileage selection is required".to_string()));
        assert_eq!(form.errors, errors);
    }

    #[test]
    fn validate_rejects_negative_down_payment() {
        let mut form = LeaseForm {
            make: "Honda".to_string(),
            term: "36".to_string(),
            mileage: "12K".to_string(),
            msrp: "30000".to_string(),
            selling_price: "29000".to_string(),
            residual_percent: "56".to_string(),
            money_factor: "0.00125".to_string(),
            down_payment: "-500".to_string(),
            ..Default::default()
        };

        let errors = form.validate().unwrap_err();

        assert_eq!(errors, vec!["Down payment cannot be negative".to_string()]);
    }

    #[test]
    fn registration_fees_become_upfront_fees() {
        let mut form = LeaseForm {
            make: "Honda".to_string(),
            term: "36".to_string(),
            mileage: "12K".to_string(),
            msrp: "30000".to_string(),
            selling_price: "29000".to_string(),
            residual_percent: "56".to_string(),
            money_factor: "0.00125".to_string(),
            registration_fees: "316".to_string(),
            ..Default::default()
        };

        let params = form.validate().unwrap();

        assert_eq!(params.upfront_fees, Decimal::from(316));
        assert_eq!(params.rebates, Decimal::ZERO);
    }
}
