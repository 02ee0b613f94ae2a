//! User-facing validation of lease form inputs.
//!
//! Unlike [`calculate_lease_payment`](super::calculate_lease_payment), which
//! accepts anything, this check produces the messages a form shows before a
//! quote is requested.

use rust_decimal::Decimal;

use crate::models::MileageAllowance;

/// Shortest term the reference tables cover.
pub const MIN_TERM_MONTHS: u32 = 12;
/// Longest term the reference tables cover.
pub const MAX_TERM_MONTHS: u32 = 96;

/// Selling prices above MSRP × this factor are treated as a typo.
const MAX_MARKUP: Decimal = Decimal::from_parts(110, 0, 0, false, 2);

/// The subset of form state that validation inspects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaseInputs {
    pub msrp: Decimal,
    pub selling_price: Decimal,
    pub term_months: Option<u32>,
    pub mileage: Option<MileageAllowance>,
    pub make: Option<String>,
}

/// Returns every problem found, in a stable order, or `Ok(())`.
pub fn validate_lease_inputs(inputs: &LeaseInputs) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if inputs.msrp <= Decimal::ZERO {
        errors.push("MSRP must be greater than 0".to_string());
    }

    if inputs.selling_price <= Decimal::ZERO {
        errors.push("Selling price must be greater than 0".to_string());
    }

    if inputs.msrp > Decimal::ZERO {
        match inputs.msrp.checked_mul(MAX_MARKUP) {
            Some(ceiling) if inputs.selling_price > ceiling => {
                errors.push("Selling price seems too high compared to MSRP".to_string());
            }
            Some(_) => {}
            None => errors.push("MSRP is too high".to_string()),
        }
    }

    match inputs.term_months {
        Some(term) if (MIN_TERM_MONTHS..=MAX_TERM_MONTHS).contains(&term) => {}
        _ => errors.push(format!(
            "Term must be between {MIN_TERM_MONTHS} and {MAX_TERM_MONTHS} months"
        )),
    }

    if inputs.mileage.is_none() {
        errors.push("Mileage selection is required".to_string());
    }

    if inputs.make.as_deref().is_none_or(|m| m.trim().is_empty()) {
        errors.push("Vehicle make is required".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn valid_inputs() -> LeaseInputs {
        LeaseInputs {
            msrp: dec!(45000),
            selling_price: dec!(42000),
            term_months: Some(36),
            mileage: Some(MileageAllowance(12000)),
            make: Some("BMW".to_string()),
        }
    }

    #[test]
    fn accepts_complete_inputs() {
        assert_eq!(validate_lease_inputs(&valid_inputs()), Ok(()));
    }

    #[test]
    fn reports_every_missing_field() {
        let errors = validate_lease_inputs(&LeaseInputs::default()).unwrap_err();

        assert_eq!(
            errors,
            vec![
                "MSRP must be greater than 0",
                "Selling price must be greater than 0",
                "Term must be between 12 and 96 months",
                "Mileage selection is required",
                "Vehicle make is required",
            ]
        );
    }

    #[test]
    fn flags_selling_price_far_above_msrp() {
        let inputs = LeaseInputs {
            selling_price: dec!(49501),
            ..valid_inputs()
        };

        let errors = validate_lease_inputs(&inputs).unwrap_err();

        assert_eq!(errors, vec!["Selling price seems too high compared to MSRP"]);
    }

    #[test]
    fn allows_selling_price_at_ten_percent_markup() {
        let inputs = LeaseInputs {
            selling_price: dec!(49500),
            ..valid_inputs()
        };

        assert_eq!(validate_lease_inputs(&inputs), Ok(()));
    }

    #[test]
    fn msrp_at_decimal_limit_is_reported_not_panicked() {
        let inputs = LeaseInputs {
            msrp: Decimal::MAX,
            selling_price: Decimal::MAX,
            ..valid_inputs()
        };

        assert_eq!(
            validate_lease_inputs(&inputs),
            Err(vec!["MSRP is too high".to_string()])
        );
    }

    #[test]
    fn rejects_terms_outside_table_range() {
        for term in [0, 6, 97, 120] {
            let inputs = LeaseInputs {
                term_months: Some(term),
                ..valid_inputs()
            };

            assert!(validate_lease_inputs(&inputs).is_err(), "term {term}");
        }
    }

    #[test]
    fn blank_make_counts_as_missing() {
        let inputs = LeaseInputs {
            make: Some("  ".to_string()),
            ..valid_inputs()
        };

        assert_eq!(
            validate_lease_inputs(&inputs),
            Err(vec!["Vehicle make is required".to_string()])
        );
    }
}
