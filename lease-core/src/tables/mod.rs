//! Immutable reference tables and the lookups over them.
//!
//! A [`ReferenceTables`] is built once at startup through
//! [`ReferenceTablesBuilder`], which validates keys and normalizes their case.
//! Every lookup is total: a miss returns `None` or a documented zero, never an
//! error.

mod keys;
mod vin;
mod zip;

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    CreditTier, DecodedVin, FeeEntry, FederalCreditEntry, MetroArea, MileageAllowance,
    MoneyFactorEntry, ResidualEntry, StateCreditEntry, StateFeeEntry, StateTaxEntry, WmiCountry,
    WmiEntry, ZipMatch, ZipMatchKind, ZipRange,
};

pub(crate) use keys::{code_key, name_key};
pub use vin::{is_valid_vin, model_year_for_code, region_for};
pub use zip::normalize_zip;

/// Errors raised while assembling reference tables from raw rows.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("duplicate key '{key}' in {table} table")]
    DuplicateKey { table: &'static str, key: String },

    #[error("invalid ZIP '{0}' (expected five digits)")]
    InvalidZip(String),

    #[error("ZIP range {start}-{end} ends before it starts")]
    InvertedZipRange { start: String, end: String },

    #[error("invalid WMI '{0}' (expected three characters)")]
    InvalidWmi(String),

    #[error("invalid WMI country prefix '{0}' (expected one or two characters)")]
    InvalidWmiPrefix(String),

    #[error("invalid state code '{0}' (expected two letters)")]
    InvalidStateCode(String),

    #[error("negative value for '{key}' in {table} table")]
    NegativeValue { table: &'static str, key: String },
}

/// All static reference data the estimator consults.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    fees: HashMap<String, FeeEntry>,
    residuals: BTreeMap<(u32, MileageAllowance), Decimal>,
    states: BTreeMap<String, StateTaxEntry>,
    money_factors: HashMap<(String, i32, CreditTier), Decimal>,
    metro_areas: Vec<MetroArea>,
    zip_ranges: Vec<ZipRange>,
    wmi: HashMap<String, String>,
    wmi_countries: HashMap<String, String>,
    federal_credits: HashMap<(String, String), FederalCreditEntry>,
    state_credits: HashMap<String, StateCreditEntry>,
    state_fees: HashMap<String, StateFeeEntry>,
    model_year_ceiling: i32,
}

impl ReferenceTables {
    pub fn builder() -> ReferenceTablesBuilder {
        ReferenceTablesBuilder::default()
    }

    // ── fees ─────────────────────────────────────────────────────────────

    pub fn fees(
        &self,
        make: &str,
    ) -> Option<&FeeEntry> {
        let hit = self.fees.get(&name_key(make));
        if hit.is_none() {
            debug!(make, "no fee data for make");
        }
        hit
    }

    /// Display names of every make with fee data, sorted.
    pub fn makes(&self) -> Vec<&str> {
        let mut makes: Vec<&str> = self.fees.values().map(|f| f.make.as_str()).collect();
        makes.sort_unstable();
        makes
    }

    // ── residuals ────────────────────────────────────────────────────────

    /// Residual percent for a term and mileage, or `None` when the matrix has
    /// no such cell. Callers should leave an existing value untouched on a
    /// miss rather than substitute zero.
    pub fn residual_percent(
        &self,
        term_months: u32,
        mileage: MileageAllowance,
    ) -> Option<Decimal> {
        let hit = self.residuals.get(&(term_months, mileage)).copied();
        if hit.is_none() {
            debug!(term_months, %mileage, "no residual for term and mileage");
        }
        hit
    }

    /// Terms present in the residual matrix, ascending.
    pub fn residual_terms(&self) -> Vec<u32> {
        let mut terms: Vec<u32> = self.residuals.keys().map(|(t, _)| *t).collect();
        terms.dedup();
        terms
    }

    /// Mileage allowances present in the residual matrix, ascending.
    pub fn mileage_allowances(&self) -> Vec<MileageAllowance> {
        let mut miles: Vec<MileageAllowance> = self.residuals.keys().map(|(_, m)| *m).collect();
        miles.sort_unstable();
        miles.dedup();
        miles
    }

    // ── states ───────────────────────────────────────────────────────────

    /// Sales tax percent for a state, or zero when the code is unknown.
    ///
    /// Zero is ambiguous: it is also the rate of states without sales tax.
    /// Use [`ReferenceTables::state`] to tell the cases apart.
    pub fn tax_rate(
        &self,
        state_code: &str,
    ) -> Decimal {
        self.state(state_code)
            .map(|s| s.tax_rate_percent)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn state(
        &self,
        state_code: &str,
    ) -> Option<&StateTaxEntry> {
        self.states.get(&code_key(state_code))
    }

    /// Every state entry ordered by code.
    pub fn states(&self) -> impl Iterator<Item = &StateTaxEntry> {
        self.states.values()
    }

    // ── money factors ────────────────────────────────────────────────────

    pub fn money_factor(
        &self,
        make: &str,
        model_year: i32,
        tier: CreditTier,
    ) -> Option<Decimal> {
        self.money_factors
            .get(&(name_key(make), model_year, tier))
            .copied()
    }

    // ── ZIP codes ────────────────────────────────────────────────────────

    /// State code for a ZIP, or `None` for malformed or unassigned input.
    pub fn zip_to_state(
        &self,
        zip: &str,
    ) -> Option<String> {
        self.lookup_zip(zip).map(|m| m.state_code)
    }

    /// Full ZIP match including whether a metro override or a general range hit.
    pub fn lookup_zip(
        &self,
        zip: &str,
    ) -> Option<ZipMatch> {
        let normalized = normalize_zip(zip)?;
        zip::find(&normalized, &self.metro_areas, &self.zip_ranges)
    }

    // ── VIN ──────────────────────────────────────────────────────────────

    /// Decodes make and model year from a VIN without any network access.
    ///
    /// Returns `None` for malformed VINs. An unknown WMI yields `make: None`.
    pub fn decode_wmi(
        &self,
        vin: &str,
    ) -> Option<DecodedVin> {
        let vin = vin.trim().to_ascii_uppercase();
        if !is_valid_vin(&vin) {
            debug!(%vin, "rejecting malformed VIN");
            return None;
        }

        let wmi = vin[..3].to_string();
        let make = self.wmi.get(&wmi).cloned();
        let model_year = vin
            .chars()
            .nth(9)
            .and_then(|code| model_year_for_code(code, self.model_year_ceiling));
        let region = vin.chars().next().and_then(region_for);
        let country = self.country_for_wmi(&wmi);

        Some(DecodedVin {
            wmi,
            make,
            model_year,
            region,
            country,
        })
    }

    /// Country of manufacture from the VIN's leading characters. The
    /// two-character prefix is tried before the first character alone.
    fn country_for_wmi(
        &self,
        wmi: &str,
    ) -> Option<String> {
        [wmi.get(..2), wmi.get(..1)]
            .into_iter()
            .flatten()
            .find_map(|prefix| self.wmi_countries.get(prefix))
            .cloned()
    }

    pub fn model_year_ceiling(&self) -> i32 {
        self.model_year_ceiling
    }

    // ── registration fees ────────────────────────────────────────────────

    pub fn state_fees(
        &self,
        state_code: &str,
    ) -> Option<&StateFeeEntry> {
        self.state_fees.get(&code_key(state_code))
    }

    /// Registration charges for a vehicle of `vehicle_value` registered in
    /// `state_code`; `zip` selects any metro surcharge. Zero for states
    /// without fee data.
    pub fn registration_fees(
        &self,
        state_code: &str,
        vehicle_value: Decimal,
        zip: &str,
    ) -> Decimal {
        let Some(entry) = self.state_fees(state_code) else {
            debug!(state_code, "no registration fee data for state");
            return Decimal::ZERO;
        };
        let metro = self.lookup_zip(zip).and_then(|hit| match hit.kind {
            ZipMatchKind::Metropolitan(name) => Some(name),
            ZipMatchKind::General(_) => None,
        });
        entry.amount_due(vehicle_value, metro.as_deref())
    }

    // ── incentives (static side) ─────────────────────────────────────────

    pub fn static_federal_credit(
        &self,
        make: &str,
        model: &str,
    ) -> Option<&FederalCreditEntry> {
        self.federal_credits.get(&(name_key(make), name_key(model)))
    }

    pub fn static_state_credit(
        &self,
        state_code: &str,
    ) -> Option<&StateCreditEntry> {
        self.state_credits.get(&code_key(state_code))
    }
}

/// Collects raw rows and validates them into a [`ReferenceTables`].
#[derive(Debug, Default)]
pub struct ReferenceTablesBuilder {
    fees: Vec<FeeEntry>,
    residuals: Vec<ResidualEntry>,
    states: Vec<StateTaxEntry>,
    money_factors: Vec<MoneyFactorEntry>,
    metro_areas: Vec<MetroArea>,
    zip_ranges: Vec<ZipRange>,
    wmi: Vec<WmiEntry>,
    wmi_countries: Vec<WmiCountry>,
    federal_credits: Vec<FederalCreditEntry>,
    state_credits: Vec<StateCreditEntry>,
    state_fees: Vec<StateFeeEntry>,
    model_year_ceiling: Option<i32>,
}

/// Ceiling used when none is configured: the newest cycle year the
/// reference data was prepared for.
pub const DEFAULT_MODEL_YEAR_CEILING: i32 = 2027;

impl ReferenceTablesBuilder {
    pub fn fees(
        mut self,
        rows: Vec<FeeEntry>,
    ) -> Self {
        self.fees = rows;
        self
    }

    pub fn residuals(
        mut self,
        rows: Vec<ResidualEntry>,
    ) -> Self {
        self.residuals = rows;
        self
    }

    pub fn states(
        mut self,
        rows: Vec<StateTaxEntry>,
    ) -> Self {
        self.states = rows;
        self
    }

    pub fn money_factors(
        mut self,
        rows: Vec<MoneyFactorEntry>,
    ) -> Self {
        self.money_factors = rows;
        self
    }

    pub fn metro_areas(
        mut self,
        rows: Vec<MetroArea>,
    ) -> Self {
        self.metro_areas = rows;
        self
    }

    pub fn zip_ranges(
        mut self,
        rows: Vec<ZipRange>,
    ) -> Self {
        self.zip_ranges = rows;
        self
    }

    pub fn wmi(
        mut self,
        rows: Vec<WmiEntry>,
    ) -> Self {
        self.wmi = rows;
        self
    }

    pub fn wmi_countries(
        mut self,
        rows: Vec<WmiCountry>,
    ) -> Self {
        self.wmi_countries = rows;
        self
    }

    pub fn state_fees(
        mut self,
        rows: Vec<StateFeeEntry>,
    ) -> Self {
        self.state_fees = rows;
        self
    }

    pub fn federal_credits(
        mut self,
        rows: Vec<FederalCreditEntry>,
    ) -> Self {
        self.federal_credits = rows;
        self
    }

    pub fn state_credits(
        mut self,
        rows: Vec<StateCreditEntry>,
    ) -> Self {
        self.state_credits = rows;
        self
    }

    pub fn model_year_ceiling(
        mut self,
        year: i32,
    ) -> Self {
        self.model_year_ceiling = Some(year);
        self
    }

    /// Validates every row and builds the lookup indexes.
    ///
    /// # Errors
    /// * [`TableError::DuplicateKey`] when two rows share a key after case
    ///   normalization.
    /// * [`TableError::InvalidZip`] / [`TableError::InvertedZipRange`] for
    ///   malformed ZIP ranges.
    /// * [`TableError::InvalidWmi`], [`TableError::InvalidWmiPrefix`] and
    ///   [`TableError::InvalidStateCode`] for malformed codes.
    /// * [`TableError::NegativeValue`] for negative fees, rates or credits.
    pub fn build(self) -> Result<ReferenceTables, TableError> {
        let mut tables = ReferenceTables {
            model_year_ceiling: self.model_year_ceiling.unwrap_or(DEFAULT_MODEL_YEAR_CEILING),
            ..ReferenceTables::default()
        };

        for fee in self.fees {
            non_negative("fees", &fee.make, fee.acquisition_fee)?;
            non_negative("fees", &fee.make, fee.disposition_fee)?;
            insert_unique(&mut tables.fees, "fees", name_key(&fee.make), fee)?;
        }

        for row in self.residuals {
            let key = (row.term_months, row.mileage);
            if tables.residuals.insert(key, row.residual_percent).is_some() {
                return Err(TableError::DuplicateKey {
                    table: "residuals",
                    key: format!("{}/{}", row.term_months, row.mileage),
                });
            }
        }

        for mut state in self.states {
            state.code = state_code(&state.code)?;
            non_negative("states", &state.code, state.tax_rate_percent)?;
            if tables.states.contains_key(&state.code) {
                return Err(TableError::DuplicateKey {
                    table: "states",
                    key: state.code,
                });
            }
            tables.states.insert(state.code.clone(), state);
        }

        for row in self.money_factors {
            let label = format!("{}/{}/{}", row.make, row.model_year, row.tier);
            non_negative("money_factors", &label, row.money_factor)?;
            let key = (name_key(&row.make), row.model_year, row.tier);
            insert_unique(&mut tables.money_factors, "money_factors", key, row.money_factor)
                .map_err(|_| TableError::DuplicateKey {
                    table: "money_factors",
                    key: label,
                })?;
        }

        for mut metro in self.metro_areas {
            check_zip_span(&metro.start, &metro.end)?;
            metro.state_code = state_code(&metro.state_code)?;
            tables.metro_areas.push(metro);
        }

        for mut range in self.zip_ranges {
            check_zip_span(&range.start, &range.end)?;
            range.state_code = state_code(&range.state_code)?;
            tables.zip_ranges.push(range);
        }

        for entry in self.wmi {
            let wmi = code_key(&entry.wmi);
            if wmi.chars().count() != 3 || !wmi.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(TableError::InvalidWmi(entry.wmi));
            }
            insert_unique(&mut tables.wmi, "wmi", wmi, entry.make)?;
        }

        for entry in self.wmi_countries {
            let prefix = code_key(&entry.prefix);
            if !(1..=2).contains(&prefix.chars().count())
                || !prefix.chars().all(|c| c.is_ascii_alphanumeric())
            {
                return Err(TableError::InvalidWmiPrefix(entry.prefix));
            }
            insert_unique(&mut tables.wmi_countries, "wmi_countries", prefix, entry.country)?;
        }

        for mut fee in self.state_fees {
            fee.state_code = state_code(&fee.state_code)?;
            for value in [
                fee.registration_fee,
                fee.title_fee,
                fee.other_fees,
                fee.value_fee_percent,
                fee.metro_excise_percent,
            ] {
                non_negative("state_fees", &fee.state_code, value)?;
            }
            let key = fee.state_code.clone();
            insert_unique(&mut tables.state_fees, "state_fees", key, fee)?;
        }

        for credit in self.federal_credits {
            let label = format!("{} {}", credit.make, credit.model);
            non_negative("federal_credits", &label, credit.credit_amount)?;
            let key = (name_key(&credit.make), name_key(&credit.model));
            insert_unique(&mut tables.federal_credits, "federal_credits", key, credit).map_err(
                |_| TableError::DuplicateKey {
                    table: "federal_credits",
                    key: label,
                },
            )?;
        }

        for mut credit in self.state_credits {
            credit.state_code = state_code(&credit.state_code)?;
            non_negative("state_credits", &credit.state_code, credit.new_vehicle_rebate)?;
            non_negative("state_credits", &credit.state_code, credit.used_vehicle_rebate)?;
            let key = credit.state_code.clone();
            insert_unique(&mut tables.state_credits, "state_credits", key, credit)?;
        }

        Ok(tables)
    }
}

fn insert_unique<K, V>(
    map: &mut HashMap<K, V>,
    table: &'static str,
    key: K,
    value: V,
) -> Result<(), TableError>
where
    K: std::hash::Hash + Eq + std::fmt::Debug,
{
    if map.contains_key(&key) {
        return Err(TableError::DuplicateKey {
            table,
            key: format!("{key:?}"),
        });
    }
    map.insert(key, value);
    Ok(())
}

fn non_negative(
    table: &'static str,
    key: &str,
    value: Decimal,
) -> Result<(), TableError> {
    if value < Decimal::ZERO {
        return Err(TableError::NegativeValue {
            table,
            key: key.to_string(),
        });
    }
    Ok(())
}

fn state_code(raw: &str) -> Result<String, TableError> {
    let code = code_key(raw);
    if code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(code)
    } else {
        Err(TableError::InvalidStateCode(raw.to_string()))
    }
}

fn check_zip_span(
    start: &str,
    end: &str,
) -> Result<(), TableError> {
    for zip in [start, end] {
        if !zip::is_zip5(zip) {
            return Err(TableError::InvalidZip(zip.to_string()));
        }
    }
    if start > end {
        return Err(TableError::InvertedZipRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(())
}
