//! Versioned incremental-borrowing-rate tables.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::RateConvention;
use crate::error::LeaseEngineError;
use crate::lease::PaymentFrequency;
use crate::types::Percent;
use crate::LeaseEngineResult;

use super::bucket::{LeaseTermBucket, LEASE_TERM_BUCKETS};
use super::resolver::payment_rate;

/// Nominal annual rate for one lease-term bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateBucketEntry {
    pub lease_term_bucket: LeaseTermBucket,
    pub yearly_rate_percent: Percent,
}

/// One version of the rate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub id: String,
    pub effective_date: NaiveDate,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub rates: Vec<RateBucketEntry>,
}

/// A bucket's yearly rate alongside its converted payment rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateMatrixRow {
    pub lease_term_bucket: LeaseTermBucket,
    pub yearly: Percent,
    pub semi_annual: Percent,
    pub quarterly: Percent,
    pub monthly: Percent,
}

impl RateTable {
    /// Build a table, rejecting duplicate buckets.
    pub fn new(
        id: impl Into<String>,
        effective_date: NaiveDate,
        is_current: bool,
        rates: Vec<RateBucketEntry>,
    ) -> LeaseEngineResult<Self> {
        let table = Self {
            id: id.into(),
            effective_date,
            is_current,
            rates,
        };
        table.validate()?;
        Ok(table)
    }

    /// At most one entry per bucket, no negative rates.
    pub fn validate(&self) -> LeaseEngineResult<()> {
        let mut seen = HashSet::new();
        for entry in &self.rates {
            if !seen.insert(entry.lease_term_bucket) {
                return Err(LeaseEngineError::InvalidInput {
                    field: format!("rate_table[{}].rates", self.id),
                    reason: format!("Duplicate entry for bucket {}", entry.lease_term_bucket),
                });
            }
            if entry.yearly_rate_percent < Decimal::ZERO {
                return Err(LeaseEngineError::InvalidInput {
                    field: format!("rate_table[{}].{}", self.id, entry.lease_term_bucket),
                    reason: "Yearly rate must be >= 0".into(),
                });
            }
        }
        Ok(())
    }

    /// Yearly rate for a bucket, if the table defines one.
    pub fn rate_for(&self, bucket: LeaseTermBucket) -> Option<Percent> {
        self.rates
            .iter()
            .find(|e| e.lease_term_bucket == bucket)
            .map(|e| e.yearly_rate_percent)
    }

    /// Start a new current table that defines every bucket, carrying each
    /// bucket's rate over from `previous` (zero where it had none).
    pub fn roll_forward(
        id: impl Into<String>,
        effective_date: NaiveDate,
        previous: Option<&RateTable>,
    ) -> Self {
        let rates = LEASE_TERM_BUCKETS
            .iter()
            .map(|&bucket| RateBucketEntry {
                lease_term_bucket: bucket,
                yearly_rate_percent: previous
                    .and_then(|t| t.rate_for(bucket))
                    .unwrap_or(Decimal::ZERO),
            })
            .collect();
        Self {
            id: id.into(),
            effective_date,
            is_current: true,
            rates,
        }
    }

    /// Set (or add) one bucket's yearly rate.
    pub fn set_rate(&mut self, bucket: LeaseTermBucket, yearly_rate_percent: Percent) -> LeaseEngineResult<()> {
        if yearly_rate_percent < Decimal::ZERO {
            return Err(LeaseEngineError::InvalidInput {
                field: format!("rate_table[{}].{}", self.id, bucket),
                reason: "Yearly rate must be >= 0".into(),
            });
        }
        match self.rates.iter_mut().find(|e| e.lease_term_bucket == bucket) {
            Some(entry) => entry.yearly_rate_percent = yearly_rate_percent,
            None => self.rates.push(RateBucketEntry {
                lease_term_bucket: bucket,
                yearly_rate_percent,
            }),
        }
        Ok(())
    }

    /// Per-frequency payment rates for all six buckets. Buckets the table
    /// does not define show zero.
    pub fn rate_matrix(&self, convention: RateConvention) -> LeaseEngineResult<Vec<RateMatrixRow>> {
        self.validate()?;
        LEASE_TERM_BUCKETS
            .iter()
            .map(|&bucket| {
                let yearly = self.rate_for(bucket).unwrap_or(Decimal::ZERO);
                Ok(RateMatrixRow {
                    lease_term_bucket: bucket,
                    yearly,
                    semi_annual: payment_rate(yearly, PaymentFrequency::SemiAnnual, convention)?,
                    quarterly: payment_rate(yearly, PaymentFrequency::Quarterly, convention)?,
                    monthly: payment_rate(yearly, PaymentFrequency::Monthly, convention)?,
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Table selection
// ---------------------------------------------------------------------------

/// The table flagged current. If several are flagged, the latest
/// effective date wins.
pub fn current_table(tables: &[RateTable]) -> Option<&RateTable> {
    tables
        .iter()
        .filter(|t| t.is_current)
        .max_by_key(|t| t.effective_date)
}

/// The table in force on `date`: latest effective date not after it.
pub fn table_effective_on(tables: &[RateTable], date: NaiveDate) -> Option<&RateTable> {
    tables
        .iter()
        .filter(|t| t.effective_date <= date)
        .max_by_key(|t| t.effective_date)
}

pub fn find_table<'a>(tables: &'a [RateTable], id: &str) -> Option<&'a RateTable> {
    tables.iter().find(|t| t.id == id)
}

/// Append a rolled-forward table to the registry. It becomes the only table
/// flagged current and starts from the previous current table's rates.
pub fn roll_registry(
    tables: &mut Vec<RateTable>,
    id: impl Into<String>,
    effective_date: NaiveDate,
) -> LeaseEngineResult<&RateTable> {
    let id = id.into();
    if find_table(tables, &id).is_some() {
        return Err(LeaseEngineError::InvalidInput {
            field: "id".into(),
            reason: format!("Rate table '{id}' already exists"),
        });
    }
    let next = RateTable::roll_forward(id, effective_date, current_table(tables));
    for table in tables.iter_mut() {
        table.is_current = false;
    }
    tables.push(next);
    let index = tables.len() - 1;
    Ok(&tables[index])
}
