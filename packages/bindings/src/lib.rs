use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use lease_engine_core::rates::{
    bucket_for_term, payment_rate, roll_registry, DiscountRateSelector, RateTable,
};
use lease_engine_core::register::{filter_leases as filter_register, FilterLeasesInput};
use lease_engine_core::schedule::{
    compute_amortization as amortize, compute_pv_schedule as pv_schedule,
    generate_lease_schedule as generate, select_rate_table, LeaseScheduleInput, ScheduleRow,
};
use lease_engine_core::{LeaseRecord, PaymentFrequency, Percent, ScheduleConfig, Years};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Inputs specific to the JS surface
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct BucketInput {
    term_years: Years,
}

#[derive(Deserialize)]
struct ConvertRateInput {
    yearly_rate_percent: Percent,
    frequency: PaymentFrequency,
    #[serde(default)]
    config: ScheduleConfig,
}

#[derive(Deserialize)]
struct ResolveRateInput {
    lease: LeaseRecord,
    #[serde(default)]
    rate_tables: Vec<RateTable>,
    #[serde(default)]
    override_rate_percent: Option<Percent>,
    /// Discard the rate stored on the lease and resolve from the table
    #[serde(default)]
    refresh: bool,
    #[serde(default)]
    config: ScheduleConfig,
}

#[derive(Deserialize)]
struct RateMatrixInput {
    table: RateTable,
    #[serde(default)]
    config: ScheduleConfig,
}

#[derive(Deserialize)]
struct RollRateTableInput {
    #[serde(default)]
    tables: Vec<RateTable>,
    id: String,
    effective_date: NaiveDate,
}

#[derive(Deserialize)]
struct PvScheduleInput {
    lease: LeaseRecord,
    #[serde(default)]
    config: ScheduleConfig,
}

#[derive(Deserialize)]
struct AmortizationInput {
    lease: LeaseRecord,
    /// Recomputed from the lease when absent
    #[serde(default)]
    pv_schedule: Option<Vec<ScheduleRow>>,
    #[serde(default)]
    config: ScheduleConfig,
}

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

#[napi]
pub fn lease_term_bucket(input_json: String) -> NapiResult<String> {
    let input: BucketInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let bucket = bucket_for_term(input.term_years).map_err(to_napi_error)?;
    serde_json::to_string(&bucket).map_err(to_napi_error)
}

#[napi]
pub fn convert_rate(input_json: String) -> NapiResult<String> {
    let input: ConvertRateInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rate = payment_rate(
        input.yearly_rate_percent,
        input.frequency,
        input.config.rate_convention,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&rate).map_err(to_napi_error)
}

#[napi]
pub fn resolve_discount_rate(input_json: String) -> NapiResult<String> {
    let input: ResolveRateInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let mut lease = input.lease;
    if input.refresh {
        lease.discount_rate_annual_percent = None;
    }

    let mut selector =
        DiscountRateSelector::for_lease(&lease, input.config.rate_convention).map_err(to_napi_error)?;
    match input.override_rate_percent {
        Some(rate) => {
            selector.override_rate(rate).map_err(to_napi_error)?;
        }
        None => {
            if let Some(table) = select_rate_table(&input.rate_tables, &lease).map_err(to_napi_error)? {
                selector.select_table(table.clone()).map_err(to_napi_error)?;
            }
        }
    }

    let updated = selector.apply_to(&lease).map_err(to_napi_error)?;
    let output = serde_json::json!({
        "selection": selector.selection(),
        "periodic_rate_percent": selector.periodic_rate_percent().map_err(to_napi_error)?,
        "lease": updated,
    });
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn rate_matrix(input_json: String) -> NapiResult<String> {
    let input: RateMatrixInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let matrix = input
        .table
        .rate_matrix(input.config.rate_convention)
        .map_err(to_napi_error)?;
    serde_json::to_string(&matrix).map_err(to_napi_error)
}

#[napi]
pub fn roll_rate_table(input_json: String) -> NapiResult<String> {
    let input: RollRateTableInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let mut tables = input.tables;
    roll_registry(&mut tables, input.id, input.effective_date).map_err(to_napi_error)?;
    serde_json::to_string(&tables).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_pv_schedule(input_json: String) -> NapiResult<String> {
    let input: PvScheduleInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rows = pv_schedule(&input.lease, &input.config).map_err(to_napi_error)?;
    serde_json::to_string(&rows).map_err(to_napi_error)
}

#[napi]
pub fn compute_amortization(input_json: String) -> NapiResult<String> {
    let input: AmortizationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let pv = match input.pv_schedule {
        Some(rows) => rows,
        None => pv_schedule(&input.lease, &input.config).map_err(to_napi_error)?,
    };
    let rows = amortize(&input.lease, &pv, &input.config).map_err(to_napi_error)?;
    serde_json::to_string(&rows).map_err(to_napi_error)
}

#[napi]
pub fn generate_lease_schedule(input_json: String) -> NapiResult<String> {
    let input: LeaseScheduleInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = generate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

#[napi]
pub fn filter_leases(input_json: String) -> NapiResult<String> {
    let input: FilterLeasesInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let matched = filter_register(&input.leases, &input.filter);
    serde_json::to_string(&matched).map_err(to_napi_error)
}
