//! End-to-end checks of the embedded reference tables.

use lease_core::{
    CreditResolver, CreditTier, LiveDataOverlay, MileageAllowance, ReferenceTables, StateCredit,
    ZipMatchKind,
};
use lease_data::loader::{parse_metro_areas, parse_zip_ranges};
use lease_data::{ReferenceTableLoader, TableFile};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn tables() -> ReferenceTables {
    ReferenceTableLoader::builtin(2027).expect("embedded tables are valid")
}

#[test]
fn zip_lookups() {
    let tables = tables();

    assert_eq!(tables.zip_to_state("90210").as_deref(), Some("CA"));
    assert_eq!(tables.zip_to_state("00000"), None);
    assert_eq!(tables.zip_to_state("501").as_deref(), Some("NY"));
    assert_eq!(tables.zip_to_state("88510").as_deref(), Some("TX"));
    assert_eq!(tables.zip_to_state("20500-0003").as_deref(), Some("DC"));
}

#[test]
fn every_zip_resolves_to_none_or_a_state_code() {
    let tables = tables();

    for n in 0..=99_999u32 {
        let zip = format!("{n:05}");
        if let Some(code) = tables.zip_to_state(&zip) {
            assert!(
                code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase()),
                "{zip} resolved to {code:?}"
            );
        }
    }
}

#[test]
fn every_zip_and_metro_state_has_a_tax_entry() {
    let tables = tables();
    let ranges = parse_zip_ranges(TableFile::ZipRanges.embedded().as_bytes()).unwrap();
    let metros = parse_metro_areas(TableFile::MetroAreas.embedded().as_bytes()).unwrap();

    let codes = ranges
        .iter()
        .map(|r| r.state_code.as_str())
        .chain(metros.iter().map(|m| m.state_code.as_str()));
    for code in codes {
        assert!(tables.state(code).is_some(), "no tax entry for {code}");
    }
}

#[test]
fn territory_zips_carry_a_tax_rate() {
    let tables = tables();

    assert_eq!(tables.tax_rate("DC"), dec!(6));
    assert_eq!(tables.tax_rate("PR"), dec!(11.5));
    let dc = tables.zip_to_state("20500").unwrap();
    assert_eq!(tables.tax_rate(&dc), dec!(6));
}

#[test]
fn registration_fees_from_embedded_tables() {
    let tables = tables();

    assert_eq!(tables.registration_fees("CA", dec!(57900), "90210"), dec!(485.35));
    assert_eq!(tables.registration_fees("WA", dec!(40000), "98101"), dec!(362));
    assert_eq!(tables.registration_fees("AL", dec!(40000), "35004"), dec!(38));
    assert_eq!(tables.registration_fees("TX", dec!(40000), "75001"), Decimal::ZERO);
}

#[test]
fn zip_lookup_reports_metro_and_region() {
    let tables = tables();

    assert_eq!(
        tables.lookup_zip("60614").unwrap().kind,
        ZipMatchKind::Metropolitan("Chicago".to_string())
    );
    assert_eq!(
        tables.lookup_zip("02134").unwrap().kind,
        ZipMatchKind::General(Some("Greater Boston".to_string()))
    );
    assert_eq!(
        tables.lookup_zip("90210").unwrap().kind,
        ZipMatchKind::General(Some("California".to_string()))
    );
}

#[test]
fn residual_matrix() {
    let tables = tables();

    assert_eq!(tables.residual_percent(36, MileageAllowance(12000)), Some(dec!(56)));
    assert_eq!(tables.residual_percent(96, MileageAllowance(30000)), Some(dec!(9)));
    assert_eq!(tables.residual_percent(30, MileageAllowance(12000)), None);
    assert_eq!(tables.residual_terms(), vec![12, 24, 36, 39, 48, 60, 72, 84, 96]);
    assert_eq!(tables.mileage_allowances().len(), 7);
}

#[test]
fn fees_tax_and_money_factors() {
    let tables = tables();

    assert_eq!(tables.fees("mercedes-benz").unwrap().acquisition_fee, dec!(895));
    assert_eq!(tables.fees("Tesla").unwrap().disposition_fee, dec!(1000));
    assert_eq!(tables.makes().len(), 39);
    assert_eq!(tables.tax_rate("CA"), dec!(7.25));
    assert_eq!(tables.tax_rate("mn"), dec!(6.875));
    assert_eq!(tables.tax_rate("ZZ"), Decimal::ZERO);
    assert_eq!(tables.states().count(), 52);
    assert_eq!(
        tables.money_factor("BMW", 2025, CreditTier::Tier2),
        Some(dec!(0.00167))
    );
    assert_eq!(
        tables.money_factor("Toyota", 2024, CreditTier::Tier1),
        Some(dec!(0.00083))
    );
}

#[test]
fn vin_decode() {
    let decoded = tables().decode_wmi("5YJ3E1EA7KF317000").unwrap();

    assert_eq!(decoded.make.as_deref(), Some("Tesla"));
    assert_eq!(decoded.model_year, Some(2019));
    assert_eq!(decoded.region, Some("North America"));
    assert_eq!(decoded.country.as_deref(), Some("United States"));

    let bmw = tables().decode_wmi("WBA73AK06R5A12345").unwrap();
    assert_eq!(bmw.make.as_deref(), Some("BMW"));
    assert_eq!(bmw.country.as_deref(), Some("Germany"));
}

#[test]
fn static_credits_resolve_without_overlay() {
    let tables = tables();
    let overlay = LiveDataOverlay::disabled();
    let credits = CreditResolver::new(&tables, &overlay);

    assert_eq!(credits.federal_credit("Tesla", "Model 3", 2025), dec!(7500));
    assert_eq!(credits.federal_credit("BMW", "i7", 2025), Decimal::ZERO);
    assert_eq!(credits.federal_credit("BMW", "iX", 2025), dec!(7500));
    assert_eq!(credits.state_credit("ZZ"), StateCredit::default());
    assert_eq!(
        credits.state_credit("CO"),
        StateCredit {
            new_vehicle: dec!(2500),
            used_vehicle: dec!(3500),
            program: Some("Colorado EV Tax Credit".to_string()),
        }
    );
}

#[test]
fn directory_override_replaces_only_present_files() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");

    let tables = ReferenceTableLoader::from_dir(&dir, 2027).expect("override loads");

    assert_eq!(tables.fees("Kia").unwrap().acquisition_fee, dec!(650));
    assert!(tables.fees("BMW").is_none());
    assert_eq!(tables.tax_rate("CA"), dec!(7.25));
}
