use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Manufacturer lease fees, keyed by make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEntry {
    pub make: String,
    pub acquisition_fee: Decimal,
    pub disposition_fee: Decimal,
}
