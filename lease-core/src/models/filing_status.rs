use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Federal tax filing status, as far as EV credit income limits care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilingStatus {
    #[default]
    Single,
    HeadOfHousehold,
    MarriedFilingJointly,
}

impl FilingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::HeadOfHousehold => "HOH",
            Self::MarriedFilingJointly => "MFJ",
        }
    }

    /// Accepts the short codes and the spelled-out names, in any case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "single" => Some(Self::Single),
            "hoh" | "head_of_household" | "head-of-household" => Some(Self::HeadOfHousehold),
            "mfj" | "joint" | "married_filing_jointly" | "married-filing-jointly" => {
                Some(Self::MarriedFilingJointly)
            }
            _ => None,
        }
    }

    /// Modified AGI ceiling for the new clean-vehicle credit.
    pub fn new_ev_income_limit(&self) -> Decimal {
        match self {
            Self::Single => Decimal::from(150_000),
            Self::HeadOfHousehold => Decimal::from(225_000),
            Self::MarriedFilingJointly => Decimal::from(300_000),
        }
    }

    /// Modified AGI ceiling for the used clean-vehicle credit.
    pub fn used_ev_income_limit(&self) -> Decimal {
        match self {
            Self::Single => Decimal::from(75_000),
            Self::HeadOfHousehold => Decimal::from(112_500),
            Self::MarriedFilingJointly => Decimal::from(150_000),
        }
    }
}
