use std::path::Path;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use lease_app::utils::parse_decimal;
use lease_app::{AppConfig, Estimator, FormEvent, LeaseForm};
use lease_core::{CreditTier, LeaseWarning, MileageAllowance};

fn fixture_estimator() -> Estimator {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/config.toml");
    let config = AppConfig::load(&path).expect("fixture config loads");
    Estimator::from_config(&config).expect("estimator builds")
}

fn number(text: &str) -> Decimal {
    parse_decimal(text).expect("numeric field")
}

#[test]
fn fixture_config_is_applied() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/config.toml");
    let config = AppConfig::load(&path).unwrap();

    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.model_year_ceiling(), 2027);

    let estimator = Estimator::from_config(&config).unwrap();
    assert_eq!(estimator.default_tier, CreditTier::Tier1);
    assert_eq!(estimator.default_mileage, MileageAllowance(12000));
    assert_eq!(estimator.tables.model_year_ceiling(), 2027);
}

#[test]
fn vin_zip_and_term_events_fill_dependent_fields() {
    let estimator = fixture_estimator();
    let mut form = LeaseForm::new(&estimator);

    form.apply(FormEvent::VinEntered("WBA53BJ01SCM12345".into()), &estimator);
    assert_eq!(form.make, "BMW");
    assert_eq!(form.year, "2025");
    assert_eq!(number(&form.acquisition_fee), dec!(925));
    assert_eq!(number(&form.money_factor), dec!(0.00146));
    assert_eq!(number(&form.apr), dec!(3.50));
    // No model or state yet.
    assert_eq!(form.rebates, "");

    form.apply(FormEvent::ModelEntered("i4".into()), &estimator);
    form.apply(FormEvent::ZipEntered("90210".into()), &estimator);
    assert_eq!(form.state, "CA");
    assert_eq!(number(&form.tax_rate), dec!(7.25));
    assert_eq!(number(&form.federal_credit), dec!(7500));
    assert_eq!(number(&form.state_new_credit), dec!(2000));
    assert_eq!(form.state_program, "CVRP");
    assert_eq!(number(&form.rebates), dec!(9500));

    form.apply(FormEvent::TermSelected("36".into()), &estimator);
    assert_eq!(number(&form.residual_percent), dec!(56));

    form.apply(FormEvent::MsrpEntered("57,900".into()), &estimator);
    form.apply(FormEvent::SellingPriceEntered("55,000".into()), &estimator);
    assert_eq!(number(&form.cap_cost_percent), dec!(94.99));
    assert_eq!(number(&form.registration_fees), dec!(485.35));
}

#[test]
fn full_form_quotes_expected_payment() {
    let estimator = fixture_estimator();
    let mut form = LeaseForm::new(&estimator);
    let events = [
        "vin=WBA53BJ01SCM12345",
        "model=i4",
        "zip=90210",
        "term=36",
        "msrp=57,900",
        "price=55,000",
    ];
    for event in events {
        form.apply(event.parse().unwrap(), &estimator);
    }

    let breakdown = form.quote(&estimator).unwrap();

    assert_eq!(breakdown.residual_value, dec!(32424.00));
    assert_eq!(breakdown.adjusted_cap_cost, dec!(46425.00));
    assert_eq!(breakdown.monthly_depreciation, dec!(388.92));
    assert_eq!(breakdown.monthly_finance_charge, dec!(115.12));
    assert_eq!(breakdown.base_payment, dec!(504.04));
    assert_eq!(breakdown.monthly_tax, dec!(36.54));
    assert_eq!(breakdown.total_monthly_payment, dec!(540.58));
    assert_eq!(breakdown.total_drive_off, dec!(1025.93));
    assert!(breakdown.warnings.is_empty());
}

#[test]
fn metro_zip_adds_excise_to_registration_fees() {
    let estimator = fixture_estimator();
    let mut form = LeaseForm::new(&estimator);

    form.apply(FormEvent::MsrpEntered("40000".into()), &estimator);
    form.apply(FormEvent::ZipEntered("98101".into()), &estimator);
    assert_eq!(form.state, "WA");
    assert_eq!(number(&form.registration_fees), dec!(362));

    form.apply(FormEvent::ZipEntered("99201".into()), &estimator);
    assert_eq!(number(&form.registration_fees), dec!(42));

    form.apply(FormEvent::RegistrationFeesEntered("0".into()), &estimator);
    assert_eq!(form.registration_fees, "0");
}

#[test]
fn district_of_columbia_zip_sets_tax_rate() {
    let estimator = fixture_estimator();
    let mut form = LeaseForm::new(&estimator);

    form.apply(FormEvent::ZipEntered("20500".into()), &estimator);

    assert_eq!(form.state, "DC");
    assert_eq!(number(&form.tax_rate), dec!(6));
}

#[test]
fn out_of_range_money_factor_quotes_overflow_warning() {
    let estimator = fixture_estimator();
    let mut form = LeaseForm::new(&estimator);
    form.make = "Honda".into();
    form.state = "OR".into();
    form.term = "36".into();
    form.msrp = "30000".into();
    form.selling_price = "29000".into();
    form.money_factor = Decimal::MAX.to_string();

    let breakdown = form.quote(&estimator).unwrap();

    assert_eq!(breakdown.warnings, vec![LeaseWarning::Overflow]);
    assert_eq!(breakdown.total_monthly_payment, Decimal::ZERO);
}

#[test]
fn quote_fills_lookups_that_were_never_triggered() {
    let estimator = fixture_estimator();
    let mut form = LeaseForm::new(&estimator);
    // State set directly on the struct: no event fired.
    form.make = "Honda".into();
    form.year = "2025".into();
    form.state = "OR".into();
    form.term = "36".into();
    form.msrp = "30000".into();
    form.selling_price = "29000".into();

    let breakdown = form.quote(&estimator).unwrap();

    assert!(!form.acquisition_fee.is_empty());
    assert_eq!(number(&form.residual_percent), dec!(56));
    assert!(!form.money_factor.is_empty());
    assert_eq!(breakdown.monthly_tax, Decimal::ZERO);
    assert_eq!(
        breakdown.total_monthly_payment,
        breakdown.base_payment + breakdown.monthly_tax
    );
}

#[test]
fn unknown_zip_leaves_state_and_tax_alone() {
    let estimator = fixture_estimator();
    let mut form = LeaseForm::new(&estimator);
    form.apply(FormEvent::StateSelected("WA".into()), &estimator);
    let tax = form.tax_rate.clone();

    form.apply(FormEvent::ZipEntered("00000".into()), &estimator);

    assert_eq!(form.state, "WA");
    assert_eq!(form.tax_rate, tax);
}

#[test]
fn incomplete_form_reports_errors_instead_of_quoting() {
    let estimator = fixture_estimator();
    let mut form = LeaseForm::new(&estimator);
    form.apply(FormEvent::MakeSelected("Toyota".into()), &estimator);

    let errors = form.quote(&estimator).unwrap_err();

    assert!(errors.contains(&"MSRP is required".to_string()));
    assert_eq!(form.errors, errors);
}
