//! Lease calculation modules.
//!
//! Pure functions only: nothing here touches reference tables, the live-data
//! overlay, or any I/O.

pub mod common;
pub mod conversions;
pub mod lease;
pub mod validation;

pub use conversions::{
    apr_to_money_factor, calculate_total_lease_cost, cap_cost_percentage, money_factor_to_apr,
    residual_percentage,
};
pub use lease::calculate_lease_payment;
pub use validation::{LeaseInputs, MAX_TERM_MONTHS, MIN_TERM_MONTHS, validate_lease_inputs};
