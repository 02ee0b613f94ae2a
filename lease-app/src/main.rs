use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tracing::debug;

use lease_app::logging::{init_logging, log_task_error};
use lease_app::utils::{format_currency, parse_decimal};
use lease_app::{AppConfig, Estimator, FormEvent, LeaseForm};
use lease_core::calculations::{apr_to_money_factor, money_factor_to_apr};
use lease_core::{FilingStatus, LeaseBreakdown, UsedEvPurchase, ZipMatchKind, normalize_zip};

// ── CLI definition ───────────────────────────────────────────────────────

/// Vehicle lease payment estimator.
///
/// Loads reference tables (built in, or overridden from a directory), reads
/// live incentive data when feeds are configured, and answers lookups and
/// payment quotes.
#[derive(Debug, Parser)]
#[command(name = "lease-estimator", version, about)]
struct Cli {
    /// TOML configuration file. Missing file means defaults.
    #[arg(long, default_value = "lease-estimator.toml")]
    config: PathBuf,

    /// Log level or EnvFilter directive; overrides `[logging] level`.
    #[arg(long)]
    log_level: Option<String>,

    /// Directory of override CSV tables; overrides `[tables] dir`.
    #[arg(long)]
    tables_dir: Option<PathBuf>,

    /// Federal credit feed file; overrides `[feeds] federal`.
    #[arg(long)]
    federal_feed: Option<PathBuf>,

    /// State incentive feed file; overrides `[feeds] state`.
    #[arg(long)]
    state_feed: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fill the lease form with field=value pairs, in order, and print a quote.
    ///
    /// Fields: make, model, year, vin, zip, state, term, mileage, tier, msrp,
    /// price, down, rebates, fees, mf, apr.
    Quote {
        #[arg(required = true)]
        fields: Vec<FormEvent>,
    },
    /// Resolve a ZIP code to its state.
    Zip { zip: String },
    /// Decode make and model year from a VIN without network access.
    Vin { vin: String },
    /// Show federal and state EV credits for a vehicle.
    Credits {
        #[arg(long)]
        make: String,
        #[arg(long)]
        model: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        state: String,
        /// Household income; zeroes the federal credit above the filer's limit.
        #[arg(long)]
        income: Option<String>,
        #[arg(long, default_value = "S", value_parser = parse_filing_status)]
        filing: FilingStatus,
    },
    /// Check a used EV purchase against the federal used-vehicle credit rules.
    UsedCredit {
        /// Sale price.
        #[arg(long)]
        price: String,
        #[arg(long)]
        model_year: i32,
        /// Defaults to the current year.
        #[arg(long)]
        purchase_year: Option<i32>,
        #[arg(long)]
        income: Option<String>,
        #[arg(long, default_value = "S", value_parser = parse_filing_status)]
        filing: FilingStatus,
        #[arg(long)]
        state: String,
    },
    /// Convert between money factor and APR.
    Convert {
        #[arg(long, conflicts_with = "apr", required_unless_present = "apr")]
        mf: Option<String>,
        #[arg(long)]
        apr: Option<String>,
    },
    /// List reference table contents.
    Tables {
        #[arg(value_enum, default_value_t = TableKind::Makes)]
        kind: TableKind,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TableKind {
    Makes,
    States,
    Terms,
}

fn parse_filing_status(s: &str) -> Result<FilingStatus, String> {
    FilingStatus::parse(s).ok_or_else(|| format!("unknown filing status '{s}' (S, HOH or MFJ)"))
}

// ── configuration ────────────────────────────────────────────────────────

fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(dir) = &cli.tables_dir {
        config.tables.dir = Some(dir.clone());
    }
    if let Some(path) = &cli.federal_feed {
        config.feeds.federal = Some(path.clone());
    }
    if let Some(path) = &cli.state_feed {
        config.feeds.state = Some(path.clone());
    }
    Ok(config)
}

// ── commands ─────────────────────────────────────────────────────────────

async fn populate_overlay(estimator: &Estimator) {
    if !estimator.overlay.is_enabled() {
        return;
    }
    let result = estimator
        .spawn_overlay_population()
        .await
        .context("incentive overlay task panicked");
    log_task_error("overlay-populate", result);
}

fn print_breakdown(
    form: &LeaseForm,
    breakdown: &LeaseBreakdown,
) {
    let vehicle = [form.year.as_str(), form.make.as_str(), form.model.as_str()]
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !vehicle.is_empty() {
        println!("Vehicle:                {vehicle}");
    }
    println!("Residual value:         {}", format_currency(breakdown.residual_value));
    println!("Adjusted cap cost:      {}", format_currency(breakdown.adjusted_cap_cost));
    println!("Total depreciation:     {}", format_currency(breakdown.total_depreciation));
    println!("Monthly depreciation:   {}", format_currency(breakdown.monthly_depreciation));
    println!("Monthly finance charge: {}", format_currency(breakdown.monthly_finance_charge));
    println!("Base payment:           {}", format_currency(breakdown.base_payment));
    println!("Monthly tax:            {}", format_currency(breakdown.monthly_tax));
    println!("Total monthly payment:  {}", format_currency(breakdown.total_monthly_payment));
    if !form.registration_fees.trim().is_empty() {
        println!("Registration fees:      {}", form.registration_fees);
    }
    println!("Due at signing:         {}", format_currency(breakdown.total_drive_off));
    println!("Total lease cost:       {}", format_currency(breakdown.total_lease_cost));
    for warning in &breakdown.warnings {
        println!("Warning: {warning:?}");
    }
}

async fn run(
    command: Command,
    estimator: &Estimator,
) -> Result<()> {
    match command {
        Command::Quote { fields } => {
            populate_overlay(estimator).await;
            let mut form = LeaseForm::new(estimator);
            for event in fields {
                form.apply(event, estimator);
            }
            match form.quote(estimator) {
                Ok(breakdown) => print_breakdown(&form, &breakdown),
                Err(errors) => {
                    for error in &errors {
                        eprintln!("error: {error}");
                    }
                    anyhow::bail!("{} form error(s)", errors.len());
                }
            }
        }
        Command::Zip { zip } => {
            let normalized = normalize_zip(&zip)
                .with_context(|| format!("'{zip}' is not a ZIP code"))?;
            match estimator.tables.lookup_zip(&normalized) {
                Some(hit) => {
                    let detail = match hit.kind {
                        ZipMatchKind::Metropolitan(metro) => format!(" ({metro} metro)"),
                        ZipMatchKind::General(Some(region)) => format!(" ({region})"),
                        ZipMatchKind::General(None) => String::new(),
                    };
                    println!("{normalized}: {}{detail}", hit.state_code);
                }
                None => println!("{normalized}: no state"),
            }
        }
        Command::Vin { vin } => {
            let decoded = estimator
                .tables
                .decode_wmi(&vin)
                .with_context(|| format!("'{vin}' is not a valid VIN"))?;
            println!("WMI:        {}", decoded.wmi);
            println!("Make:       {}", decoded.make.as_deref().unwrap_or("unknown"));
            match decoded.model_year {
                Some(year) => println!("Model year: {year}"),
                None => println!("Model year: unknown"),
            }
            println!("Region:     {}", decoded.region.unwrap_or("unknown"));
            println!("Country:    {}", decoded.country.as_deref().unwrap_or("unknown"));
        }
        Command::Credits {
            make,
            model,
            year,
            state,
            income,
            filing,
        } => {
            populate_overlay(estimator).await;
            let credits = estimator.credits();
            let federal = match income {
                Some(income) => {
                    let income = parse_decimal(&income)?;
                    credits.federal_credit_for_filer(&make, &model, year, filing, income)
                }
                None => credits.federal_credit(&make, &model, year),
            };
            let state_credit = credits.state_credit(&state);
            println!("Federal:        {}", format_currency(federal));
            println!("State (new):    {}", format_currency(state_credit.new_vehicle));
            println!("State (used):   {}", format_currency(state_credit.used_vehicle));
            if let Some(program) = &state_credit.program {
                println!("State program:  {program}");
            }
            println!(
                "Total (new):    {}",
                format_currency(federal.saturating_add(state_credit.new_vehicle))
            );
        }
        Command::UsedCredit {
            price,
            model_year,
            purchase_year,
            income,
            filing,
            state,
        } => {
            populate_overlay(estimator).await;
            let income = income.as_deref().map(parse_decimal).transpose()?;
            let purchase = UsedEvPurchase {
                sale_price: parse_decimal(&price)?,
                model_year,
                purchase_year: purchase_year.unwrap_or_else(|| Local::now().year()),
                filing_status: filing,
                income,
            };
            let credit = estimator.credits().used_vehicle_credit(&purchase, &state);
            println!("Federal (used): {}", format_currency(credit.federal));
            println!("State (used):   {}", format_currency(credit.state));
            println!("Total:          {}", format_currency(credit.total()));
            for reason in &credit.ineligible {
                println!("Not eligible:   {reason:?}");
            }
        }
        Command::Convert { mf, apr } => {
            if let Some(mf) = mf {
                let mf: Decimal = parse_decimal(&mf)?;
                println!("{}% APR", money_factor_to_apr(mf));
            } else if let Some(apr) = apr {
                let apr: Decimal = parse_decimal(&apr)?;
                println!("{} money factor", apr_to_money_factor(apr));
            }
        }
        Command::Tables { kind } => match kind {
            TableKind::Makes => {
                for make in estimator.tables.makes() {
                    println!("{make}");
                }
            }
            TableKind::States => {
                for state in estimator.tables.states() {
                    println!("{} {:<16} {}%", state.code, state.name, state.tax_rate_percent);
                }
            }
            TableKind::Terms => {
                let terms = estimator.tables.residual_terms();
                let miles = estimator.tables.mileage_allowances();
                println!(
                    "terms (months): {}",
                    terms.iter().map(u32::to_string).collect::<Vec<_>>().join(", ")
                );
                println!(
                    "mileage:        {}",
                    miles.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
                );
            }
        },
    }
    Ok(())
}

// ── entry point ──────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    init_logging(&config.logging.level, config.logging.file.as_deref())?;
    debug!(?config, "configuration resolved");

    let estimator = Estimator::from_config(&config)?;
    run(cli.command, &estimator).await
}
