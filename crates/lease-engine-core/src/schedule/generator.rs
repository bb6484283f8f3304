//! End-to-end schedule generation: resolve the rate if the lease needs one,
//! then build both schedules and their totals.

use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::ScheduleConfig;
use crate::error::LeaseEngineError;
use crate::lease::LeaseRecord;
use crate::rates::{
    bucket_for_term, current_table, find_table, resolve_for_lease, table_effective_on,
    LeaseTermBucket, RateTable, ResolvedRate,
};
use crate::rates::resolver::no_table_error;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Years};
use crate::LeaseEngineResult;

use super::amortization::{compute_amortization, AmortizationRow};
use super::checked_total;
use super::present_value::{compute_pv_schedule, ScheduleRow};

/// Everything needed to schedule one lease.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseScheduleInput {
    pub lease: LeaseRecord,
    /// Rate tables to resolve from when the lease carries no rate
    #[serde(default)]
    pub rate_tables: Vec<RateTable>,
    #[serde(default)]
    pub config: ScheduleConfig,
}

/// Totals across both schedules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// Undiscounted total of all lease payments
    pub total_payments: Money,
    /// Initial lease liability and ROU asset
    pub total_present_value: Money,
    pub total_interest_expense: Money,
    pub total_principal_reduction: Money,
    pub total_depreciation: Money,
    pub final_closing_liability: Money,
    pub final_asset_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseScheduleOutput {
    pub lease_term_months: u32,
    pub lease_term_years: Years,
    pub lease_term_bucket: LeaseTermBucket,
    /// Annual rate the schedules were computed with
    pub discount_rate_annual_percent: Percent,
    /// Present when the rate came from a rate table rather than the record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_rate: Option<ResolvedRate>,
    pub pv_schedule: Vec<ScheduleRow>,
    pub amortization_schedule: Vec<AmortizationRow>,
    pub summary: ScheduleSummary,
}

/// Pick the table a lease's rate should come from: the table named on the
/// record, else the one in force at commencement, else the current one.
pub fn select_rate_table<'a>(
    tables: &'a [RateTable],
    lease: &LeaseRecord,
) -> LeaseEngineResult<Option<&'a RateTable>> {
    if let Some(id) = lease.rate_table_id.as_deref() {
        return find_table(tables, id).map(Some).ok_or_else(|| LeaseEngineError::InvalidInput {
            field: "rate_table_id".into(),
            reason: format!("Unknown rate table '{id}'"),
        });
    }
    Ok(table_effective_on(tables, lease.commencement_date).or_else(|| current_table(tables)))
}

/// Resolve (if needed) and compute the present-value and amortization
/// schedules for a lease.
///
/// Fatal conditions (bad term, unresolvable rate) are reported before any
/// row is produced. A zero rate is computed but flagged in `warnings`.
pub fn generate_lease_schedule(
    input: &LeaseScheduleInput,
) -> LeaseEngineResult<ComputationOutput<LeaseScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let config = &input.config;

    input.lease.validate()?;
    let term_months = input.lease.term_months()?;
    let term_years = input.lease.term_years()?;
    let bucket = bucket_for_term(term_years)?;

    // --- Rate resolution ---
    let (lease, resolved_rate) = match input.lease.discount_rate_annual_percent {
        Some(_) => (input.lease.clone(), None),
        None => {
            let table = select_rate_table(&input.rate_tables, &input.lease)?
                .ok_or_else(|| no_table_error(term_years))?;
            let resolved = resolve_for_lease(&input.lease, table, config.rate_convention)?;
            let mut lease = input.lease.with_discount_rate(resolved.annual_rate_percent);
            lease.rate_table_id = Some(resolved.table_id.clone());
            (lease, Some(resolved))
        }
    };
    let annual_percent = lease
        .discount_rate_annual_percent
        .unwrap_or(Decimal::ZERO);

    if annual_percent.is_zero() {
        warn!("lease scheduled with a 0% discount rate");
        warnings.push(
            "Discount rate is 0%: present value equals the nominal payment total. \
             Check that the rate was not left unresolved."
                .to_string(),
        );
    }
    if lease.base_payment.is_zero() {
        warnings.push("Base payment is zero: the schedule carries no liability".to_string());
    }

    // --- Schedules ---
    let pv_schedule = compute_pv_schedule(&lease, config)?;
    let amortization_schedule = compute_amortization(&lease, &pv_schedule, config)?;

    let summary = summarize(&pv_schedule, &amortization_schedule)?;
    if !config.within_tolerance(summary.final_closing_liability) {
        warnings.push(format!(
            "Final closing liability {} exceeds tolerance {}: payments do not fully amortize the liability",
            summary.final_closing_liability.round_dp(2),
            config.closing_tolerance
        ));
    }

    debug!(
        "scheduled lease {}: {} periods, {} months",
        lease.id.as_deref().unwrap_or("<unsaved>"),
        pv_schedule.len(),
        amortization_schedule.len()
    );

    let output = LeaseScheduleOutput {
        lease_term_months: term_months,
        lease_term_years: term_years,
        lease_term_bucket: bucket,
        discount_rate_annual_percent: annual_percent,
        resolved_rate,
        pv_schedule,
        amortization_schedule,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "IFRS 16 / ASC 842 lease liability: present value of payments, \
         effective-interest roll-forward, straight-line ROU depreciation",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn summarize(
    pv: &[ScheduleRow],
    amortization: &[AmortizationRow],
) -> LeaseEngineResult<ScheduleSummary> {
    let last = amortization.last();
    Ok(ScheduleSummary {
        total_payments: checked_total(pv.iter().map(|r| r.payment), "total_payments")?,
        total_present_value: checked_total(
            pv.iter().map(|r| r.present_value),
            "total_present_value",
        )?,
        total_interest_expense: checked_total(
            amortization.iter().map(|r| r.interest_expense),
            "total_interest_expense",
        )?,
        total_principal_reduction: checked_total(
            amortization.iter().map(|r| r.principal_reduction),
            "total_principal_reduction",
        )?,
        total_depreciation: checked_total(
            amortization.iter().map(|r| r.depreciation),
            "total_depreciation",
        )?,
        final_closing_liability: last.map(|r| r.closing_liability).unwrap_or(Decimal::ZERO),
        final_asset_value: last.map(|r| r.asset_value).unwrap_or(Decimal::ZERO),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lease::PaymentInterval;
    use crate::rates::RateBucketEntry;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tables() -> Vec<RateTable> {
        vec![
            RateTable::new(
                "2023",
                date(2023, 1, 1),
                false,
                vec![RateBucketEntry {
                    lease_term_bucket: LeaseTermBucket::UpToThree,
                    yearly_rate_percent: dec!(6),
                }],
            )
            .unwrap(),
            RateTable::new(
                "2024",
                date(2024, 1, 1),
                true,
                vec![RateBucketEntry {
                    lease_term_bucket: LeaseTermBucket::UpToThree,
                    yearly_rate_percent: dec!(8),
                }],
            )
            .unwrap(),
        ]
    }

    fn lease(rate: Option<Decimal>) -> LeaseRecord {
        LeaseRecord::new(
            date(2024, 1, 1),
            date(2026, 12, 31),
            PaymentInterval::Quarterly,
            dec!(10000),
            rate,
        )
    }

    #[test]
    fn test_resolves_from_table_in_force_at_commencement() {
        let input = LeaseScheduleInput {
            lease: lease(None),
            rate_tables: tables(),
            config: ScheduleConfig::default(),
        };
        let out = generate_lease_schedule(&input).unwrap();
        let resolved = out.result.resolved_rate.as_ref().unwrap();
        assert_eq!(resolved.table_id, "2024");
        assert_eq!(out.result.discount_rate_annual_percent, dec!(8));
        assert_eq!(out.result.pv_schedule.len(), 12);
        assert!(out.warnings.is_empty(), "unexpected warnings {:?}", out.warnings);
    }

    #[test]
    fn test_named_table_wins() {
        let mut l = lease(None);
        l.rate_table_id = Some("2023".into());
        let input = LeaseScheduleInput {
            lease: l,
            rate_tables: tables(),
            config: ScheduleConfig::default(),
        };
        let out = generate_lease_schedule(&input).unwrap();
        assert_eq!(out.result.discount_rate_annual_percent, dec!(6));
    }

    #[test]
    fn test_unknown_table_id_rejected() {
        let mut l = lease(None);
        l.rate_table_id = Some("1999".into());
        let input = LeaseScheduleInput {
            lease: l,
            rate_tables: tables(),
            config: ScheduleConfig::default(),
        };
        assert!(matches!(
            generate_lease_schedule(&input),
            Err(LeaseEngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_no_tables_and_no_rate_fails_recoverably() {
        let input = LeaseScheduleInput {
            lease: lease(None),
            rate_tables: Vec::new(),
            config: ScheduleConfig::default(),
        };
        let err = generate_lease_schedule(&input).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_zero_rate_warns() {
        let input = LeaseScheduleInput {
            lease: lease(Some(Decimal::ZERO)),
            rate_tables: Vec::new(),
            config: ScheduleConfig::default(),
        };
        let out = generate_lease_schedule(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.result.summary.total_present_value, dec!(120000));
    }
}
