use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Annual mileage allowance in miles (e.g. `12000`).
///
/// Lease programs advertise allowances as `"12K"`; both spellings parse to the
/// same value so tables and form input agree on one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MileageAllowance(pub u32);

impl MileageAllowance {
    /// Parses `"12K"`, `"12k"`, `"12000"` or `"12,000"`.
    ///
    /// Returns `None` for empty, non-numeric or zero input.
    pub fn parse(s: &str) -> Option<Self> {
        let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
        let miles = match cleaned.strip_suffix(['K', 'k']) {
            Some(thousands) => thousands.trim().parse::<u32>().ok()?.checked_mul(1000)?,
            None => cleaned.parse::<u32>().ok()?,
        };
        (miles > 0).then_some(Self(miles))
    }

    pub fn miles(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for MileageAllowance {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.0 % 1000 == 0 {
            write!(f, "{}K", self.0 / 1000)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// One cell of the residual matrix: term × mileage → percent of MSRP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidualEntry {
    pub term_months: u32,
    pub mileage: MileageAllowance,
    pub residual_percent: Decimal,
}
