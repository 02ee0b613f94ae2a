use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{percent_to_rate, round_half_up};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTaxEntry {
    /// Two-letter postal code, stored uppercase.
    pub code: String,
    pub name: String,
    pub tax_rate_percent: Decimal,
}

/// Registration and title charges a state collects when the vehicle is
/// registered, paid at signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFeeEntry {
    /// Two-letter postal code, stored uppercase.
    pub state_code: String,
    pub registration_fee: Decimal,
    pub title_fee: Decimal,
    /// Flat surcharges (smog abatement and similar).
    pub other_fees: Decimal,
    /// Percent of vehicle value charged statewide (e.g. a vehicle license fee).
    pub value_fee_percent: Decimal,
    /// Metro area whose ZIPs pay [`StateFeeEntry::metro_excise_percent`] on top.
    pub metro_area: Option<String>,
    pub metro_excise_percent: Decimal,
}

impl StateFeeEntry {
    /// Total due at registration, rounded to cents. `metro` is the name of the
    /// metro area the buyer's ZIP falls in, if any.
    pub fn amount_due(
        &self,
        vehicle_value: Decimal,
        metro: Option<&str>,
    ) -> Decimal {
        let mut percent = self.value_fee_percent;
        let in_metro = match (self.metro_area.as_deref(), metro) {
            (Some(area), Some(metro)) => area.eq_ignore_ascii_case(metro.trim()),
            _ => false,
        };
        if in_metro {
            percent = percent.saturating_add(self.metro_excise_percent);
        }

        let value_fee = vehicle_value.saturating_mul(percent_to_rate(percent));
        round_half_up(
            self.registration_fee
                .saturating_add(self.title_fee)
                .saturating_add(self.other_fees)
                .saturating_add(value_fee),
        )
    }
}
