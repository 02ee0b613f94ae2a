use std::io::Read;
use std::path::{Path, PathBuf};

use lease_core::{
    CreditTier, FederalCreditEntry, FederalEligibility, FeeEntry, MetroArea, MileageAllowance,
    MoneyFactorEntry, ReferenceTables, ResidualEntry, StateCreditEntry, StateFeeEntry,
    StateTaxEntry, TableError, WmiCountry, WmiEntry, ZipRange,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading reference table data.
#[derive(Debug, Error)]
pub enum TableLoadError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("{file}: {source}")]
    InFile {
        file: &'static str,
        #[source]
        source: Box<TableLoadError>,
    },

    #[error("Invalid reference tables: {0}")]
    Table(#[from] TableError),
}

impl From<csv::Error> for TableLoadError {
    fn from(err: csv::Error) -> Self {
        TableLoadError::CsvParse(err.to_string())
    }
}

/// The reference table files, each with an embedded canonical copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFile {
    Fees,
    Residuals,
    States,
    MoneyFactors,
    ZipRanges,
    MetroAreas,
    Wmi,
    WmiCountries,
    FederalCredits,
    StateIncentives,
    StateFees,
}

impl TableFile {
    pub fn all() -> &'static [TableFile] {
        &[
            TableFile::Fees,
            TableFile::Residuals,
            TableFile::States,
            TableFile::MoneyFactors,
            TableFile::ZipRanges,
            TableFile::MetroAreas,
            TableFile::Wmi,
            TableFile::WmiCountries,
            TableFile::FederalCredits,
            TableFile::StateIncentives,
            TableFile::StateFees,
        ]
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            TableFile::Fees => "fees.csv",
            TableFile::Residuals => "residuals.csv",
            TableFile::States => "state_tax.csv",
            TableFile::MoneyFactors => "money_factors.csv",
            TableFile::ZipRanges => "zip_ranges.csv",
            TableFile::MetroAreas => "metro_areas.csv",
            TableFile::Wmi => "wmi.csv",
            TableFile::WmiCountries => "wmi_countries.csv",
            TableFile::FederalCredits => "federal_credits.csv",
            TableFile::StateIncentives => "state_incentives.csv",
            TableFile::StateFees => "state_fees.csv",
        }
    }

    pub fn embedded(&self) -> &'static str {
        match self {
            TableFile::Fees => include_str!("../data/fees.csv"),
            TableFile::Residuals => include_str!("../data/residuals.csv"),
            TableFile::States => include_str!("../data/state_tax.csv"),
            TableFile::MoneyFactors => include_str!("../data/money_factors.csv"),
            TableFile::ZipRanges => include_str!("../data/zip_ranges.csv"),
            TableFile::MetroAreas => include_str!("../data/metro_areas.csv"),
            TableFile::Wmi => include_str!("../data/wmi.csv"),
            TableFile::WmiCountries => include_str!("../data/wmi_countries.csv"),
            TableFile::FederalCredits => include_str!("../data/federal_credits.csv"),
            TableFile::StateIncentives => include_str!("../data/state_incentives.csv"),
            TableFile::StateFees => include_str!("../data/state_fees.csv"),
        }
    }
}

/// A row of `residuals.csv`: one cell of the term × mileage matrix.
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct ResidualRecord {
    term_months: u32,
    mileage: u32,
    residual_percent: Decimal,
}

/// A row of `money_factors.csv`. `tier` is `tier1`..`tier5`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct MoneyFactorRecord {
    make: String,
    model_year: i32,
    tier: String,
    money_factor: Decimal,
}

/// A row of `federal_credits.csv`.
///
/// An empty `eligible` column means the row carries no eligibility metadata.
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct FederalCreditRecord {
    make: String,
    model: String,
    credit_amount: Decimal,
    eligible: Option<bool>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    msrp_cap: Option<Decimal>,
    assembly_location: Option<String>,
    reason: Option<String>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn read_records<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>, TableLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();

    for result in csv_reader.deserialize() {
        let record: T = result?;
        records.push(record);
    }

    Ok(records)
}

pub fn parse_fees<R: Read>(reader: R) -> Result<Vec<FeeEntry>, TableLoadError> {
    read_records(reader)
}

pub fn parse_residuals<R: Read>(reader: R) -> Result<Vec<ResidualEntry>, TableLoadError> {
    read_records::<_, ResidualRecord>(reader)?
        .into_iter()
        .map(|r| {
            if r.mileage == 0 {
                return Err(TableLoadError::InvalidRecord(format!(
                    "zero mileage for {}-month term",
                    r.term_months
                )));
            }
            Ok(ResidualEntry {
                term_months: r.term_months,
                mileage: MileageAllowance(r.mileage),
                residual_percent: r.residual_percent,
            })
        })
        .collect()
}

pub fn parse_states<R: Read>(reader: R) -> Result<Vec<StateTaxEntry>, TableLoadError> {
    read_records(reader)
}

pub fn parse_money_factors<R: Read>(reader: R) -> Result<Vec<MoneyFactorEntry>, TableLoadError> {
    read_records::<_, MoneyFactorRecord>(reader)?
        .into_iter()
        .map(|r| {
            let tier = CreditTier::parse(&r.tier).ok_or_else(|| {
                TableLoadError::InvalidRecord(format!("unknown credit tier '{}'", r.tier))
            })?;
            Ok(MoneyFactorEntry {
                make: r.make,
                model_year: r.model_year,
                tier,
                money_factor: r.money_factor,
            })
        })
        .collect()
}

pub fn parse_zip_ranges<R: Read>(reader: R) -> Result<Vec<ZipRange>, TableLoadError> {
    let ranges: Vec<ZipRange> = read_records(reader)?;
    Ok(ranges
        .into_iter()
        .map(|r| ZipRange {
            region: non_empty(r.region),
            ..r
        })
        .collect())
}

pub fn parse_metro_areas<R: Read>(reader: R) -> Result<Vec<MetroArea>, TableLoadError> {
    read_records(reader)
}

pub fn parse_wmi<R: Read>(reader: R) -> Result<Vec<WmiEntry>, TableLoadError> {
    read_records(reader)
}

pub fn parse_wmi_countries<R: Read>(reader: R) -> Result<Vec<WmiCountry>, TableLoadError> {
    read_records(reader)
}

pub fn parse_state_fees<R: Read>(reader: R) -> Result<Vec<StateFeeEntry>, TableLoadError> {
    let fees: Vec<StateFeeEntry> = read_records(reader)?;
    Ok(fees
        .into_iter()
        .map(|f| StateFeeEntry {
            metro_area: non_empty(f.metro_area),
            ..f
        })
        .collect())
}

pub fn parse_federal_credits<R: Read>(
    reader: R
) -> Result<Vec<FederalCreditEntry>, TableLoadError> {
    Ok(read_records::<_, FederalCreditRecord>(reader)?
        .into_iter()
        .map(|r| FederalCreditEntry {
            make: r.make,
            model: r.model,
            credit_amount: r.credit_amount,
            eligibility: r.eligible.map(|eligible| FederalEligibility {
                eligible,
                msrp_cap: r.msrp_cap,
                assembly_location: non_empty(r.assembly_location),
                reason: non_empty(r.reason),
            }),
        })
        .collect())
}

pub fn parse_state_incentives<R: Read>(
    reader: R
) -> Result<Vec<StateCreditEntry>, TableLoadError> {
    read_records(reader)
}

/// Builds [`ReferenceTables`] from the canonical CSV files.
///
/// The embedded copies are compiled into the binary, so [`builtin`] never
/// touches the filesystem. [`from_dir`] lets an operator override any subset
/// of the files; missing files fall back to the embedded copy.
///
/// [`builtin`]: ReferenceTableLoader::builtin
/// [`from_dir`]: ReferenceTableLoader::from_dir
pub struct ReferenceTableLoader;

impl ReferenceTableLoader {
    pub fn builtin(model_year_ceiling: i32) -> Result<ReferenceTables, TableLoadError> {
        Self::assemble(None, model_year_ceiling)
    }

    pub fn from_dir(
        dir: &Path,
        model_year_ceiling: i32,
    ) -> Result<ReferenceTables, TableLoadError> {
        Self::assemble(Some(dir), model_year_ceiling)
    }

    fn assemble(
        dir: Option<&Path>,
        model_year_ceiling: i32,
    ) -> Result<ReferenceTables, TableLoadError> {
        let tables = ReferenceTables::builder()
            .fees(load(dir, TableFile::Fees, |b| parse_fees(b))?)
            .residuals(load(dir, TableFile::Residuals, |b| parse_residuals(b))?)
            .states(load(dir, TableFile::States, |b| parse_states(b))?)
            .money_factors(load(dir, TableFile::MoneyFactors, |b| parse_money_factors(b))?)
            .zip_ranges(load(dir, TableFile::ZipRanges, |b| parse_zip_ranges(b))?)
            .metro_areas(load(dir, TableFile::MetroAreas, |b| parse_metro_areas(b))?)
            .wmi(load(dir, TableFile::Wmi, |b| parse_wmi(b))?)
            .wmi_countries(load(dir, TableFile::WmiCountries, |b| parse_wmi_countries(b))?)
            .federal_credits(load(dir, TableFile::FederalCredits, |b| parse_federal_credits(b))?)
            .state_credits(load(dir, TableFile::StateIncentives, |b| parse_state_incentives(b))?)
            .state_fees(load(dir, TableFile::StateFees, |b| parse_state_fees(b))?)
            .model_year_ceiling(model_year_ceiling)
            .build()?;

        info!(
            makes = tables.makes().len(),
            states = tables.states().count(),
            model_year_ceiling,
            "reference tables loaded"
        );
        Ok(tables)
    }
}

/// Reads one table from `dir` if the file exists there, otherwise from the
/// embedded copy, and parses it.
fn load<T>(
    dir: Option<&Path>,
    file: TableFile,
    parse: impl FnOnce(&[u8]) -> Result<Vec<T>, TableLoadError>,
) -> Result<Vec<T>, TableLoadError> {
    let in_file = |source: TableLoadError| TableLoadError::InFile {
        file: file.file_name(),
        source: Box::new(source),
    };

    let override_path = dir
        .map(|d| d.join(file.file_name()))
        .filter(|p| p.is_file());

    match override_path {
        Some(path) => {
            info!(path = %path.display(), "using reference table override");
            let text = std::fs::read_to_string(&path).map_err(|e| TableLoadError::Io {
                path: path.clone(),
                message: e.to_string(),
            })?;
            parse(text.as_bytes()).map_err(in_file)
        }
        None => {
            debug!(file = file.file_name(), "using embedded reference table");
            parse(file.embedded().as_bytes()).map_err(in_file)
        }
    }
}
