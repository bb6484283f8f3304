//! Present-value and monthly amortization schedules for a lease whose
//! discount rate is known.

pub mod amortization;
pub mod generator;
pub mod present_value;

pub use amortization::{compute_amortization, AmortizationRow};
pub use generator::{
    generate_lease_schedule, select_rate_table, LeaseScheduleInput, LeaseScheduleOutput,
    ScheduleSummary,
};
pub use present_value::{compute_pv_schedule, total_periods, ScheduleRow};

use rust_decimal::Decimal;

use crate::error::LeaseEngineError;
use crate::lease::LeaseRecord;
use crate::rates::bucket_for_term;
use crate::types::{percent_to_rate, Rate};
use crate::LeaseEngineResult;

/// The lease's annual discount rate as a decimal fraction. A record that
/// never had its rate resolved is an error, not a zero rate.
pub(crate) fn lease_annual_rate(lease: &LeaseRecord) -> LeaseEngineResult<Rate> {
    match lease.discount_rate_annual_percent {
        Some(percent) => Ok(percent_to_rate(percent)),
        None => Err(LeaseEngineError::RateNotResolved {
            bucket: bucket_for_term(lease.term_years()?)?.to_string(),
            reason: "lease carries no discount rate".into(),
        }),
    }
}

/// Error for a schedule amount that leaves Decimal's range.
pub(crate) fn out_of_range(field: &str, context: impl std::fmt::Display) -> LeaseEngineError {
    LeaseEngineError::InvalidInput {
        field: field.into(),
        reason: format!("{context} is out of range"),
    }
}

/// Sum that fails instead of panicking on overflow.
pub(crate) fn checked_total<I>(values: I, field: &str) -> LeaseEngineResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(v)
            .ok_or_else(|| out_of_range(field, "total"))
    })
}
