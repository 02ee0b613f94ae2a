mod fee;
mod filing_status;
mod incentive;
mod lease;
mod money_factor;
mod residual;
mod state_tax;
mod vin;
mod zip;

pub use fee::FeeEntry;
pub use filing_status::FilingStatus;
pub use incentive::{
    FederalCreditEntry, FederalEligibility, LiveFederalCredit, StateCredit, StateCreditEntry,
    USED_EV_CREDIT, USED_EV_MAX_PRICE, USED_EV_MIN_AGE_YEARS, UsedEvCredit, UsedEvIneligibility,
    UsedEvPurchase,
};
pub use lease::{LeaseBreakdown, LeaseParams, LeaseWarning};
pub use money_factor::{CreditTier, MoneyFactorEntry};
pub use residual::{MileageAllowance, ResidualEntry};
pub use state_tax::{StateFeeEntry, StateTaxEntry};
pub use vin::{DecodedVin, WmiCountry, WmiEntry};
pub use zip::{MetroArea, ZipMatch, ZipMatchKind, ZipRange};
