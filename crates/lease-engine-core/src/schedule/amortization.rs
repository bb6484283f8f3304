//! Monthly lease liability roll-forward and straight-line ROU depreciation.

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ScheduleConfig;
use crate::error::LeaseEngineError;
use crate::lease::{add_months, LeaseRecord, PaymentTiming};
use crate::time_value::periodic_rate;
use crate::types::Money;
use crate::LeaseEngineResult;

use super::{checked_total, lease_annual_rate, out_of_range};
use super::present_value::{total_periods, ScheduleRow};

/// A single month of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Month number (1-indexed)
    pub month: u32,
    pub date: NaiveDate,
    /// Lease liability at start of month
    pub opening_liability: Money,
    pub interest_expense: Money,
    /// Payment falling due this month (zero between payment dates)
    pub payment: Money,
    /// payment - interest; negative when interest accrues without a payment
    pub principal_reduction: Money,
    pub closing_liability: Money,
    pub depreciation: Money,
    /// Right-of-use asset carrying value at end of month
    pub asset_value: Money,
}

/// Roll the lease liability forward month by month.
///
/// The total present value of `pv_schedule` seeds both the opening liability
/// and the right-of-use asset. Each PV period's payment lands in the month it
/// falls due: the first month of the period for beginning timing, the last
/// month for end timing (a short final period pays in the lease's last month).
pub fn compute_amortization(
    lease: &LeaseRecord,
    pv_schedule: &[ScheduleRow],
    config: &ScheduleConfig,
) -> LeaseEngineResult<Vec<AmortizationRow>> {
    lease.validate()?;
    let annual_rate = lease_annual_rate(lease)?;

    let total_months = lease.term_months()?;
    let interval_months = lease.payment_interval.interval_months();
    let expected_periods = total_periods(total_months, interval_months);
    if pv_schedule.len() != expected_periods as usize {
        return Err(LeaseEngineError::InvalidInput {
            field: "pv_schedule".into(),
            reason: format!(
                "Expected {expected_periods} payment periods for a {total_months}-month lease, got {}",
                pv_schedule.len()
            ),
        });
    }

    let monthly_rate = periodic_rate(annual_rate, 12, config.rate_convention)?;
    let total_pv: Money =
        checked_total(pv_schedule.iter().map(|r| r.present_value), "pv_schedule")?;
    let monthly_depreciation = total_pv / Decimal::from(total_months);

    let mut payments = vec![Decimal::ZERO; total_months as usize];
    for (k, row) in pv_schedule.iter().enumerate() {
        let month =
            due_month(k as u32, interval_months, lease.payment_timing, total_months) as usize;
        payments[month] = payments[month].checked_add(row.payment).ok_or_else(|| {
            out_of_range("pv_schedule", format!("payment due in month {}", month + 1))
        })?;
    }

    let mut schedule = Vec::with_capacity(total_months as usize);
    let mut opening_liability = total_pv;

    for (m, &payment) in payments.iter().enumerate() {
        let month_index = m as u32;
        let liability_error = || {
            out_of_range("discount_rate_annual_percent", format!("liability in month {}", m + 1))
        };
        let interest_expense = opening_liability
            .checked_mul(monthly_rate)
            .ok_or_else(liability_error)?;
        let principal_reduction = payment
            .checked_sub(interest_expense)
            .ok_or_else(liability_error)?;
        let closing_liability = opening_liability
            .checked_sub(principal_reduction)
            .ok_or_else(liability_error)?;

        schedule.push(AmortizationRow {
            month: month_index + 1,
            date: add_months(lease.commencement_date, month_index)?,
            opening_liability,
            interest_expense,
            payment,
            principal_reduction,
            closing_liability,
            depreciation: monthly_depreciation,
            asset_value: total_pv - monthly_depreciation * Decimal::from(month_index + 1),
        });

        opening_liability = closing_liability;
    }

    if !config.within_tolerance(opening_liability) {
        warn!(
            "liability does not fully amortize: {opening_liability} left after {total_months} months"
        );
    }
    debug!("amortization schedule: {total_months} months, opening liability {total_pv}");
    Ok(schedule)
}

/// Zero-based month in which payment `k` falls due.
fn due_month(k: u32, interval_months: u32, timing: PaymentTiming, total_months: u32) -> u32 {
    let last = total_months.saturating_sub(1);
    match timing {
        PaymentTiming::Beginning => (k * interval_months).min(last),
        PaymentTiming::End => ((k + 1) * interval_months - 1).min(last),
    }
}
