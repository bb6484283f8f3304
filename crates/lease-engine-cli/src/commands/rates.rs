use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use lease_engine_core::rates::{
    bucket_for_term, convert_rate_percent, payment_rate, roll_registry, DiscountRateSelector,
    RateTable,
};
use lease_engine_core::{LeaseRecord, PaymentFrequency, PaymentInterval};

use super::{pick_table, FrequencyArg, RateTables};
use crate::input;
use crate::settings::Settings;

/// Arguments for bucket lookup
#[derive(Args)]
pub struct BucketArgs {
    /// Lease term in years
    #[arg(long, conflicts_with_all = ["commencement", "expiration"])]
    pub term_years: Option<Decimal>,

    /// Commencement date (YYYY-MM-DD); the term is derived from the dates
    #[arg(long, requires = "expiration")]
    pub commencement: Option<NaiveDate>,

    /// Expiration date (YYYY-MM-DD)
    #[arg(long, requires = "commencement")]
    pub expiration: Option<NaiveDate>,
}

/// Arguments for yearly-to-periodic rate conversion
#[derive(Args)]
pub struct ConvertRateArgs {
    /// Nominal yearly rate in percent (e.g. 8 for 8%)
    #[arg(long)]
    pub yearly_rate: Decimal,

    /// Payment frequency; all frequencies when omitted
    #[arg(long)]
    pub frequency: Option<FrequencyArg>,
}

/// Arguments for discount-rate resolution
#[derive(Args)]
pub struct ResolveRateArgs {
    /// Path to JSON/YAML input: { lease, rate_tables }
    #[arg(long)]
    pub input: Option<String>,

    /// Rate table id to resolve from
    #[arg(long)]
    pub table_id: Option<String>,

    /// Manual annual rate in percent, taking precedence over the table
    #[arg(long)]
    pub override_rate: Option<Decimal>,

    /// Ignore any rate stored on the lease and resolve from the table
    #[arg(long)]
    pub refresh: bool,
}

/// Arguments for the rate matrix
#[derive(Args)]
pub struct RateMatrixArgs {
    /// Path to JSON/YAML rate table or list of tables
    #[arg(long)]
    pub input: Option<String>,

    /// Table id (defaults to the current table)
    #[arg(long)]
    pub table_id: Option<String>,

    /// Use the table in force on this date
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

/// Arguments for rolling the rate table forward
#[derive(Args)]
pub struct RollRateTableArgs {
    /// Path to JSON/YAML rate table or list of tables
    #[arg(long)]
    pub input: Option<String>,

    /// Id of the new table
    #[arg(long)]
    pub id: String,

    /// Effective date of the new table (YYYY-MM-DD)
    #[arg(long)]
    pub effective_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct ResolveRateInput {
    lease: LeaseRecord,
    #[serde(default)]
    rate_tables: Vec<RateTable>,
}

pub fn run_bucket(args: BucketArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let term_years = match (args.term_years, args.commencement, args.expiration) {
        (Some(years), _, _) => years,
        (None, Some(commencement), Some(expiration)) => LeaseRecord::new(
            commencement,
            expiration,
            PaymentInterval::default(),
            Decimal::ZERO,
            None,
        )
        .term_years()?,
        _ => return Err("--term-years or --commencement/--expiration is required".into()),
    };
    let bucket = bucket_for_term(term_years)?;
    Ok(json!({
        "term_years": term_years.normalize().to_string(),
        "lease_term_bucket": bucket,
        "upper_bound_years": bucket.upper_bound().map(|b| b.to_string()),
    }))
}

pub fn run_convert_rate(
    args: ConvertRateArgs,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let convention = settings.convention();
    let frequencies: Vec<PaymentFrequency> = match args.frequency {
        Some(f) => vec![f.into()],
        None => PaymentFrequency::ALL.to_vec(),
    };
    let rows = frequencies
        .into_iter()
        .map(|frequency| -> Result<Value, Box<dyn std::error::Error>> {
            Ok(json!({
                "frequency": frequency,
                "periods_per_year": frequency.periods_per_year(),
                "yearly_rate_percent": args.yearly_rate.to_string(),
                "periodic_rate_percent": payment_rate(args.yearly_rate, frequency, convention)?.to_string(),
                "unrounded_percent": convert_rate_percent(args.yearly_rate, frequency, convention)?.to_string(),
            }))
        })
        .collect::<Result<Vec<Value>, Box<dyn std::error::Error>>>()?;
    Ok(json!({ "rate_convention": convention, "rows": rows }))
}

pub fn run_resolve_rate(
    args: ResolveRateArgs,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let input: ResolveRateInput = input::read_required(args.input.as_deref(), "rate resolution")?;
    let convention = settings.convention();
    let mut lease = input.lease;
    if args.refresh {
        lease.discount_rate_annual_percent = None;
    }

    let mut selector = DiscountRateSelector::for_lease(&lease, convention)?;
    if !input.rate_tables.is_empty() {
        let table = match args.table_id.as_deref().or(lease.rate_table_id.as_deref()) {
            Some(id) => pick_table(&input.rate_tables, Some(id), None)?,
            None => pick_table(&input.rate_tables, None, Some(lease.commencement_date))
                .or_else(|_| pick_table(&input.rate_tables, None, None))?,
        };
        if args.override_rate.is_none() {
            selector.select_table(table.clone())?;
        }
    }
    if let Some(rate) = args.override_rate {
        selector.override_rate(rate)?;
    }

    let updated = selector.apply_to(&lease)?;
    info!(
        lease = lease.id.as_deref().unwrap_or("<unsaved>"),
        overridden = selector.is_overridden(),
        "discount rate selected"
    );
    Ok(json!({
        "selection": selector.selection(),
        "annual_rate_percent": selector.annual_rate_percent().map(|r| r.to_string()),
        "periodic_rate_percent": selector.periodic_rate_percent()?.map(|r| r.to_string()),
        "frequency": selector.frequency(),
        "lease": updated,
    }))
}

pub fn run_rate_matrix(
    args: RateMatrixArgs,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let tables = input::read_required::<RateTables>(args.input.as_deref(), "the rate matrix")?
        .into_vec();
    let table = pick_table(&tables, args.table_id.as_deref(), args.as_of)?;
    let matrix = table.rate_matrix(settings.convention())?;
    Ok(json!({
        "table_id": table.id,
        "effective_date": table.effective_date,
        "rate_convention": settings.convention(),
        "rates": matrix,
    }))
}

pub fn run_roll_rate_table(args: RollRateTableArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut tables: Vec<RateTable> = input::read_optional::<RateTables>(args.input.as_deref())?
        .map(RateTables::into_vec)
        .unwrap_or_default();
    let rolled = roll_registry(&mut tables, args.id, args.effective_date)?;
    info!(id = %rolled.id, effective_date = %rolled.effective_date, "rolled rate table forward");
    Ok(serde_json::to_value(tables)?)
}
