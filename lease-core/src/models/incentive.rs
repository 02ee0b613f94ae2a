use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FilingStatus;

/// Federal used clean-vehicle credit amount.
pub const USED_EV_CREDIT: Decimal = Decimal::from_parts(4000, 0, 0, false, 0);
/// Highest sale price that still qualifies for the used-vehicle credit.
pub const USED_EV_MAX_PRICE: Decimal = Decimal::from_parts(25000, 0, 0, false, 0);
/// The vehicle's model year must be at least this many years before the purchase year.
pub const USED_EV_MIN_AGE_YEARS: i32 = 2;

/// Eligibility metadata attached to some static federal credit rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalEligibility {
    pub eligible: bool,
    pub msrp_cap: Option<Decimal>,
    pub assembly_location: Option<String>,
    pub reason: Option<String>,
}

/// Static federal clean-vehicle credit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalCreditEntry {
    pub make: String,
    pub model: String,
    pub credit_amount: Decimal,
    pub eligibility: Option<FederalEligibility>,
}

impl FederalCreditEntry {
    /// Credit this row grants. Rows explicitly flagged ineligible grant nothing.
    pub fn effective_amount(&self) -> Decimal {
        match &self.eligibility {
            Some(e) if !e.eligible => Decimal::ZERO,
            _ => self.credit_amount,
        }
    }
}

/// Federal credit record delivered by the live feed; carries a model year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveFederalCredit {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCreditEntry {
    pub state_code: String,
    pub new_vehicle_rebate: Decimal,
    pub used_vehicle_rebate: Decimal,
    pub program_name: String,
}

/// Resolved state incentive. `Default` is the "no program" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateCredit {
    pub new_vehicle: Decimal,
    pub used_vehicle: Decimal,
    pub program: Option<String>,
}

impl From<&StateCreditEntry> for StateCredit {
    fn from(entry: &StateCreditEntry) -> Self {
        Self {
            new_vehicle: entry.new_vehicle_rebate,
            used_vehicle: entry.used_vehicle_rebate,
            program: (!entry.program_name.is_empty()).then(|| entry.program_name.clone()),
        }
    }
}

/// A used EV purchase to check against the federal used-vehicle credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedEvPurchase {
    pub sale_price: Decimal,
    pub model_year: i32,
    pub purchase_year: i32,
    pub filing_status: FilingStatus,
    /// Modified AGI. `None` skips the income test.
    pub income: Option<Decimal>,
}

/// Why a used EV purchase does not qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsedEvIneligibility {
    PriceAboveLimit,
    VehicleTooNew,
    IncomeAboveLimit,
}

impl UsedEvPurchase {
    /// Every failed requirement, in a stable order. Empty when eligible.
    pub fn ineligibility(&self) -> Vec<UsedEvIneligibility> {
        let mut reasons = Vec::new();
        if self.sale_price > USED_EV_MAX_PRICE {
            reasons.push(UsedEvIneligibility::PriceAboveLimit);
        }
        if self.purchase_year.saturating_sub(self.model_year) < USED_EV_MIN_AGE_YEARS {
            reasons.push(UsedEvIneligibility::VehicleTooNew);
        }
        if self
            .income
            .is_some_and(|income| income > self.filing_status.used_ev_income_limit())
        {
            reasons.push(UsedEvIneligibility::IncomeAboveLimit);
        }
        reasons
    }
}

/// Resolved used-vehicle incentives.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsedEvCredit {
    pub federal: Decimal,
    pub state: Decimal,
    pub ineligible: Vec<UsedEvIneligibility>,
}

impl UsedEvCredit {
    pub fn total(&self) -> Decimal {
        self.federal.saturating_add(self.state)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn entry(eligibility: Option<FederalEligibility>) -> FederalCreditEntry {
        FederalCreditEntry {
            make: "BMW".to_string(),
            model: "i7".to_string(),
            credit_amount: dec!(7500),
            eligibility,
        }
    }

    #[test]
    fn effective_amount_without_metadata_is_credit_amount() {
        assert_eq!(entry(None).effective_amount(), dec!(7500));
    }

    #[test]
    fn effective_amount_is_zero_when_flagged_ineligible() {
        let ineligible = FederalEligibility {
            eligible: false,
            msrp_cap: None,
            assembly_location: None,
            reason: Some("MSRP exceeds sedan cap".to_string()),
        };

        assert_eq!(entry(Some(ineligible)).effective_amount(), Decimal::ZERO);
    }

    #[test]
    fn state_credit_from_entry_drops_empty_program_name() {
        let entry = StateCreditEntry {
            state_code: "WA".to_string(),
            new_vehicle_rebate: dec!(0),
            used_vehicle_rebate: dec!(0),
            program_name: String::new(),
        };

        assert_eq!(StateCredit::from(&entry).program, None);
    }

    fn purchase() -> UsedEvPurchase {
        UsedEvPurchase {
            sale_price: dec!(22000),
            model_year: 2022,
            purchase_year: 2025,
            filing_status: FilingStatus::Single,
            income: Some(dec!(60000)),
        }
    }

    #[test]
    fn qualifying_used_purchase_has_no_reasons() {
        assert!(purchase().ineligibility().is_empty());
    }

    #[test]
    fn used_purchase_limits_are_inclusive() {
        let at_limits = UsedEvPurchase {
            sale_price: dec!(25000),
            model_year: 2023,
            income: Some(dec!(75000)),
            ..purchase()
        };

        assert!(at_limits.ineligibility().is_empty());
    }

    #[test]
    fn used_purchase_reports_every_failed_requirement() {
        let failing = UsedEvPurchase {
            sale_price: dec!(25000.01),
            model_year: 2024,
            income: Some(dec!(75000.01)),
            ..purchase()
        };

        assert_eq!(
            failing.ineligibility(),
            vec![
                UsedEvIneligibility::PriceAboveLimit,
                UsedEvIneligibility::VehicleTooNew,
                UsedEvIneligibility::IncomeAboveLimit,
            ]
        );
    }

    #[test]
    fn unknown_income_skips_income_test() {
        let no_income = UsedEvPurchase {
            income: None,
            filing_status: FilingStatus::HeadOfHousehold,
            ..purchase()
        };

        assert!(no_income.ineligibility().is_empty());
    }
}
