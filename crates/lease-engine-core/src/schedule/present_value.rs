use chrono::{Days, NaiveDate};
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ScheduleConfig;
use crate::error::LeaseEngineError;
use crate::lease::{add_months, LeaseRecord, PaymentTiming};
use crate::time_value::{discount_factor, periodic_rate};
use crate::types::Money;
use crate::LeaseEngineResult;

use super::{lease_annual_rate, out_of_range};

/// One payment period of the present-value schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Period number (1-indexed)
    pub period: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub discount_factor: Decimal,
    pub payment: Money,
    /// payment × discount_factor
    pub present_value: Money,
}

/// Number of payment periods: ceil(term_months / interval_months), which is
/// ceil(term_years × periods_per_year) without a decimal detour.
pub fn total_periods(term_months: u32, interval_months: u32) -> u32 {
    term_months.div_ceil(interval_months.max(1))
}

/// Discount each period's payment back to commencement.
///
/// End-of-period payments are discounted by (1 + r)^(i+1), beginning-of-period
/// payments by (1 + r)^i. Period start dates are always offsets from the
/// commencement date, so month-end clamping never accumulates.
pub fn compute_pv_schedule(
    lease: &LeaseRecord,
    config: &ScheduleConfig,
) -> LeaseEngineResult<Vec<ScheduleRow>> {
    lease.validate()?;
    let annual_rate = lease_annual_rate(lease)?;

    let interval_months = lease.payment_interval.interval_months();
    let period_rate = periodic_rate(
        annual_rate,
        lease.payment_interval.periods_per_year(),
        config.rate_convention,
    )?;
    let periods = total_periods(lease.term_months()?, interval_months);

    if annual_rate.is_zero() {
        warn!("discount rate is 0%: every discount factor is 1");
    }

    let mut schedule = Vec::with_capacity(periods as usize);

    for i in 0..periods {
        let exponent = match lease.payment_timing {
            PaymentTiming::End => i + 1,
            PaymentTiming::Beginning => i,
        };
        let factor = discount_factor(period_rate, exponent)?;

        let start_date = add_months(lease.commencement_date, i * interval_months)?;
        let end_date = add_months(lease.commencement_date, (i + 1) * interval_months)?
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| LeaseEngineError::DateError(format!("period {} end date", i + 1)))?;

        let payment = lease.base_payment;
        let present_value = payment.checked_mul(factor).ok_or_else(|| {
            out_of_range("base_payment", format!("present value of period {}", i + 1))
        })?;
        schedule.push(ScheduleRow {
            period: i + 1,
            start_date,
            end_date,
            discount_factor: factor,
            payment,
            present_value,
        });
    }

    debug!("present-value schedule: {periods} periods at {period_rate} per period");
    Ok(schedule)
}
