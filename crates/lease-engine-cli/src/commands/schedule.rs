use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use lease_engine_core::schedule::{
    compute_amortization, compute_pv_schedule, generate_lease_schedule, LeaseScheduleInput,
};
use lease_engine_core::{LeaseRecord, PaymentTiming};

use super::{IntervalArg, RateTables};
use crate::input;
use crate::settings::Settings;

/// Lease terms given as flags instead of an input file
#[derive(Args)]
pub struct LeaseTermsArgs {
    /// Path to JSON/YAML lease record (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Commencement date (YYYY-MM-DD)
    #[arg(long)]
    pub commencement: Option<NaiveDate>,

    /// Expiration date (YYYY-MM-DD)
    #[arg(long)]
    pub expiration: Option<NaiveDate>,

    /// Payment interval
    #[arg(long, default_value = "monthly")]
    pub interval: IntervalArg,

    /// Payment per period
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Pay at the beginning of each period instead of the end
    #[arg(long)]
    pub in_advance: bool,

    /// Annual discount rate in percent; replaces the rate on the record
    #[arg(long)]
    pub discount_rate: Option<Decimal>,
}

/// Arguments for the present-value schedule
#[derive(Args)]
pub struct PvScheduleArgs {
    #[command(flatten)]
    pub lease: LeaseTermsArgs,
}

/// Arguments for the monthly amortization schedule
#[derive(Args)]
pub struct AmortizationArgs {
    #[command(flatten)]
    pub lease: LeaseTermsArgs,
}

/// Arguments for end-to-end schedule generation
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML input: { lease, rate_tables, config }
    #[arg(long)]
    pub input: Option<String>,

    /// Rate table file (JSON/YAML) replacing the input's tables
    #[arg(long)]
    pub rate_tables: Option<String>,

    /// Annual discount rate in percent; skips table resolution
    #[arg(long)]
    pub discount_rate: Option<Decimal>,
}

impl LeaseTermsArgs {
    fn into_lease(self) -> Result<LeaseRecord, Box<dyn std::error::Error>> {
        let lease = match input::read_optional::<LeaseRecord>(self.input.as_deref())? {
            Some(lease) => lease,
            None => LeaseRecord::new(
                self.commencement
                    .ok_or("--commencement is required (or provide --input)")?,
                self.expiration
                    .ok_or("--expiration is required (or provide --input)")?,
                self.interval.into(),
                self.payment
                    .ok_or("--payment is required (or provide --input)")?,
                None,
            ),
        };
        Ok(self.apply_overrides(lease))
    }

    /// Timing and rate flags win over whatever the record carries.
    fn apply_overrides(&self, mut lease: LeaseRecord) -> LeaseRecord {
        if self.in_advance {
            lease.payment_timing = PaymentTiming::Beginning;
        }
        if let Some(rate) = self.discount_rate {
            lease.discount_rate_annual_percent = Some(rate);
        }
        lease
    }
}

pub fn run_pv_schedule(
    args: PvScheduleArgs,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let lease = args.lease.into_lease()?;
    let rows = compute_pv_schedule(&lease, &settings.config())?;
    let total_payments: Decimal = rows.iter().map(|r| r.payment).sum();
    let total_present_value: Decimal = rows.iter().map(|r| r.present_value).sum();
    Ok(json!({
        "total_payments": total_payments,
        "total_present_value": total_present_value,
        "pv_schedule": rows,
    }))
}

pub fn run_amortization(
    args: AmortizationArgs,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let lease = args.lease.into_lease()?;
    let config = settings.config();
    let pv = compute_pv_schedule(&lease, &config)?;
    let rows = compute_amortization(&lease, &pv, &config)?;
    Ok(json!({
        "final_closing_liability": rows.last().map(|r| r.closing_liability),
        "amortization_schedule": rows,
    }))
}

pub fn run_schedule(
    args: ScheduleArgs,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut schedule_input: LeaseScheduleInput =
        input::read_required(args.input.as_deref(), "schedule generation")?;
    if let Some(path) = args.rate_tables.as_deref() {
        schedule_input.rate_tables = input::file::read_input::<RateTables>(path)?.into_vec();
    }
    if let Some(rate) = args.discount_rate {
        schedule_input.lease.discount_rate_annual_percent = Some(rate);
    }
    schedule_input.config = settings.resolve(Some(schedule_input.config));

    let result = generate_lease_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}
