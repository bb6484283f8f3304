use chrono::NaiveDate;
use clap::Args;
use serde::Deserialize;
use serde_json::{json, Value};

use lease_engine_core::register::{filter_leases, FilterLeasesInput, LeaseFilter};
use lease_engine_core::LeaseRecord;

use crate::input;

/// Arguments for register filtering
#[derive(Args)]
pub struct FilterLeasesArgs {
    /// Path to JSON/YAML input: a list of leases or { leases, filter }
    #[arg(long)]
    pub input: Option<String>,

    /// Case-insensitive text matched against lessor entity and contract number
    #[arg(long)]
    pub search: Option<String>,

    /// Keep leases not yet expired on this date (YYYY-MM-DD)
    #[arg(long)]
    pub active_on: Option<NaiveDate>,

    /// Keep only leases edited after creation
    #[arg(long)]
    pub modified_only: bool,

    /// Keep only low-value leases
    #[arg(long)]
    pub low_value_only: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RegisterInput {
    Filtered(FilterLeasesInput),
    Leases(Vec<LeaseRecord>),
}

pub fn run_filter_leases(args: FilterLeasesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (leases, mut filter) =
        match input::read_required::<RegisterInput>(args.input.as_deref(), "lease filtering")? {
            RegisterInput::Filtered(input) => (input.leases, input.filter),
            RegisterInput::Leases(leases) => (leases, LeaseFilter::default()),
        };

    if args.search.is_some() {
        filter.search_text = args.search;
    }
    if args.active_on.is_some() {
        filter.active_on = args.active_on;
    }
    filter.modified_only |= args.modified_only;
    filter.low_value_only |= args.low_value_only;

    let matched = filter_leases(&leases, &filter);
    Ok(json!({
        "total": leases.len(),
        "matched": matched.len(),
        "leases": matched,
    }))
}
