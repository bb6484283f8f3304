use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RateConvention;
use crate::error::LeaseEngineError;
use crate::lease::{LeaseRecord, PaymentFrequency};
use crate::time_value::{periodic_rate, round_rate};
use crate::types::{percent_to_rate, rate_to_percent, Percent, Years};
use crate::LeaseEngineResult;

use super::bucket::{bucket_for_term, LeaseTermBucket};
use super::table::RateTable;

/// Decimal places the resolved per-period rate is rounded to.
pub const RATE_DECIMAL_PLACES: u32 = 4;

/// Outcome of a successful rate resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRate {
    pub bucket: LeaseTermBucket,
    pub table_id: String,
    /// Nominal annual rate taken from the table
    pub annual_rate_percent: Percent,
    pub frequency: PaymentFrequency,
    pub periods_per_year: u32,
    /// Per-period rate, rounded to `RATE_DECIMAL_PLACES`
    pub periodic_rate_percent: Percent,
}

/// Convert a yearly percentage into the per-period percentage for
/// `frequency`, unrounded.
pub fn convert_rate_percent(
    yearly_percent: Percent,
    frequency: PaymentFrequency,
    convention: RateConvention,
) -> LeaseEngineResult<Percent> {
    let periodic = periodic_rate(
        percent_to_rate(yearly_percent),
        frequency.periods_per_year(),
        convention,
    )?;
    Ok(rate_to_percent(periodic))
}

/// Per-period percentage for `frequency`, rounded to `RATE_DECIMAL_PLACES`.
pub fn payment_rate(
    yearly_percent: Percent,
    frequency: PaymentFrequency,
    convention: RateConvention,
) -> LeaseEngineResult<Percent> {
    Ok(round_rate(
        convert_rate_percent(yearly_percent, frequency, convention)?,
        RATE_DECIMAL_PLACES,
    ))
}

/// Resolve the discount rate for a lease term and payment frequency from a
/// rate table.
///
/// Fails with `RateNotResolved` when the table has no entry for the bucket
/// or the entry is zero; a zero rate is never handed back as a result.
pub fn resolve_rate(
    term_years: Years,
    frequency: PaymentFrequency,
    table: &RateTable,
    convention: RateConvention,
) -> LeaseEngineResult<ResolvedRate> {
    table.validate()?;
    let bucket = bucket_for_term(term_years)?;

    let annual_rate_percent = match table.rate_for(bucket) {
        Some(rate) if !rate.is_zero() => rate,
        Some(_) => {
            return Err(LeaseEngineError::RateNotResolved {
                bucket: bucket.to_string(),
                reason: format!("rate is zero in table {}", table.id),
            })
        }
        None => {
            return Err(LeaseEngineError::RateNotResolved {
                bucket: bucket.to_string(),
                reason: format!("no entry in table {}", table.id),
            })
        }
    };

    let periodic_rate_percent = payment_rate(annual_rate_percent, frequency, convention)?;
    debug!(
        "resolved {bucket} from table {}: {annual_rate_percent}% annual -> {periodic_rate_percent}% {frequency}",
        table.id
    );

    Ok(ResolvedRate {
        bucket,
        table_id: table.id.clone(),
        annual_rate_percent,
        frequency,
        periods_per_year: frequency.periods_per_year(),
        periodic_rate_percent,
    })
}

/// Resolve using the lease's own term and payment interval.
pub fn resolve_for_lease(
    lease: &LeaseRecord,
    table: &RateTable,
    convention: RateConvention,
) -> LeaseEngineResult<ResolvedRate> {
    resolve_rate(
        lease.term_years()?,
        lease.payment_interval.frequency(),
        table,
        convention,
    )
}

/// Resolution failure for a lease when no rate table is available at all.
pub(crate) fn no_table_error(term_years: Years) -> LeaseEngineError {
    let bucket = bucket_for_term(term_years)
        .map(|b| b.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    LeaseEngineError::RateNotResolved {
        bucket,
        reason: "no rate table available".into(),
    }
}

impl ResolvedRate {
    /// Per-period rate as a decimal fraction.
    pub fn periodic_rate(&self) -> Decimal {
        percent_to_rate(self.periodic_rate_percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::table::RateBucketEntry;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn table() -> RateTable {
        RateTable::new(
            "2024",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            true,
            vec![
                RateBucketEntry {
                    lease_term_bucket: LeaseTermBucket::UpToThree,
                    yearly_rate_percent: dec!(8),
                },
                RateBucketEntry {
                    lease_term_bucket: LeaseTermBucket::ThreeToFive,
                    yearly_rate_percent: dec!(0),
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_quarterly() {
        let resolved =
            resolve_rate(dec!(3), PaymentFrequency::Quarterly, &table(), RateConvention::Compound)
                .unwrap();
        assert_eq!(resolved.bucket, LeaseTermBucket::UpToThree);
        assert_eq!(resolved.annual_rate_percent, dec!(8));
        assert_eq!(resolved.periods_per_year, 4);
        assert_eq!(resolved.periodic_rate_percent, dec!(1.9427));
        assert_eq!(resolved.table_id, "2024");
    }

    #[test]
    fn test_annual_frequency_returns_table_rate() {
        let resolved =
            resolve_rate(dec!(2), PaymentFrequency::Annual, &table(), RateConvention::Compound)
                .unwrap();
        assert_eq!(resolved.periodic_rate_percent, dec!(8));
    }

    #[test]
    fn test_zero_entry_is_not_resolved() {
        let err = resolve_rate(dec!(4), PaymentFrequency::Monthly, &table(), RateConvention::Compound)
            .unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("3-5 year"));
    }

    #[test]
    fn test_missing_bucket_is_not_resolved() {
        let err = resolve_rate(dec!(20), PaymentFrequency::Monthly, &table(), RateConvention::Compound)
            .unwrap_err();
        match err {
            LeaseEngineError::RateNotResolved { bucket, .. } => assert_eq!(bucket, "15-30 year"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_simple_convention_resolution() {
        let resolved =
            resolve_rate(dec!(1), PaymentFrequency::Quarterly, &table(), RateConvention::Simple)
                .unwrap();
        assert_eq!(resolved.periodic_rate_percent, dec!(2));
        assert_eq!(resolved.periodic_rate(), dec!(0.02));
    }
}
