pub mod rates;
pub mod register;
pub mod schedule;

use clap::ValueEnum;
use serde::Deserialize;

use lease_engine_core::rates::{current_table, find_table, table_effective_on, RateTable};
use lease_engine_core::{PaymentFrequency, PaymentInterval};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Annual,
    SemiAnnual,
    Quarterly,
    Monthly,
}

impl From<FrequencyArg> for PaymentFrequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Annual => PaymentFrequency::Annual,
            FrequencyArg::SemiAnnual => PaymentFrequency::SemiAnnual,
            FrequencyArg::Quarterly => PaymentFrequency::Quarterly,
            FrequencyArg::Monthly => PaymentFrequency::Monthly,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum IntervalArg {
    Monthly,
    Quarterly,
    Annual,
}

impl From<IntervalArg> for PaymentInterval {
    fn from(arg: IntervalArg) -> Self {
        match arg {
            IntervalArg::Monthly => PaymentInterval::Monthly,
            IntervalArg::Quarterly => PaymentInterval::Quarterly,
            IntervalArg::Annual => PaymentInterval::Annual,
        }
    }
}

/// Rate tables as supplied on the command line: a single table or a
/// whole registry.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RateTables {
    One(RateTable),
    Many(Vec<RateTable>),
}

impl RateTables {
    pub fn into_vec(self) -> Vec<RateTable> {
        match self {
            RateTables::One(table) => vec![table],
            RateTables::Many(tables) => tables,
        }
    }
}

/// Pick one table: by id, else the one in force on `as_of`, else the
/// current table, else the only table supplied.
pub fn pick_table<'a>(
    tables: &'a [RateTable],
    id: Option<&str>,
    as_of: Option<chrono::NaiveDate>,
) -> Result<&'a RateTable, Box<dyn std::error::Error>> {
    if let Some(id) = id {
        return find_table(tables, id).ok_or_else(|| format!("Unknown rate table '{id}'").into());
    }
    if let Some(date) = as_of {
        return table_effective_on(tables, date)
            .ok_or_else(|| format!("No rate table in force on {date}").into());
    }
    current_table(tables)
        .or(if tables.len() == 1 { tables.first() } else { None })
        .ok_or_else(|| "No current rate table; pass --table-id or --as-of".into())
}
