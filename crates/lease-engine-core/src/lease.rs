//! Lease records as supplied by the application layer.
//!
//! The engine only reads the dates, payment terms and discount rate. The
//! descriptive fields ride along so that callers can round-trip a record
//! without losing data, and so the register filters have something to match.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LeaseEngineError;
use crate::types::{Money, Percent, Years};
use crate::LeaseEngineResult;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Compounding / payment frequency used for rate conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentFrequency {
    #[serde(alias = "yearly")]
    Annual,
    #[serde(alias = "semi_annual", alias = "semiannual")]
    SemiAnnual,
    Quarterly,
    Monthly,
}

impl PaymentFrequency {
    pub const ALL: [PaymentFrequency; 4] = [
        PaymentFrequency::Annual,
        PaymentFrequency::SemiAnnual,
        PaymentFrequency::Quarterly,
        PaymentFrequency::Monthly,
    ];

    pub fn periods_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Annual => 1,
            PaymentFrequency::SemiAnnual => 2,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::Monthly => 12,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentFrequency::Annual => "annual",
            PaymentFrequency::SemiAnnual => "semi-annual",
            PaymentFrequency::Quarterly => "quarterly",
            PaymentFrequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How often a lease payment falls due.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentInterval {
    #[default]
    Monthly,
    Quarterly,
    #[serde(alias = "yearly")]
    Annual,
}

impl PaymentInterval {
    /// Parse a free-form interval label. Unrecognised labels fall back to
    /// monthly, which is how stored records with odd values are treated.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "quarterly" => PaymentInterval::Quarterly,
            "annual" | "yearly" => PaymentInterval::Annual,
            _ => PaymentInterval::Monthly,
        }
    }

    pub fn interval_months(self) -> u32 {
        match self {
            PaymentInterval::Monthly => 1,
            PaymentInterval::Quarterly => 3,
            PaymentInterval::Annual => 12,
        }
    }

    pub fn periods_per_year(self) -> u32 {
        12 / self.interval_months()
    }

    pub fn frequency(self) -> PaymentFrequency {
        match self {
            PaymentInterval::Monthly => PaymentFrequency::Monthly,
            PaymentInterval::Quarterly => PaymentFrequency::Quarterly,
            PaymentInterval::Annual => PaymentFrequency::Annual,
        }
    }
}

impl fmt::Display for PaymentInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.frequency().label())
    }
}

/// Whether a period's payment is made at its start or its end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentTiming {
    Beginning,
    #[default]
    End,
}

// ---------------------------------------------------------------------------
// Lease record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_number: Option<String>,
    #[serde(default)]
    pub lessor_entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_description: Option<String>,
    pub commencement_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub payment_interval: PaymentInterval,
    #[serde(default)]
    pub payment_timing: PaymentTiming,
    /// Payment charged each period
    pub base_payment: Money,
    /// Nominal annual discount rate in percent; `None` until resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_rate_annual_percent: Option<Percent>,
    /// Rate table the discount rate was (or should be) taken from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_table_id: Option<String>,
    #[serde(default)]
    pub is_low_value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LeaseRecord {
    /// Minimal record carrying only the fields the engine computes with.
    pub fn new(
        commencement_date: NaiveDate,
        expiration_date: NaiveDate,
        payment_interval: PaymentInterval,
        base_payment: Money,
        discount_rate_annual_percent: Option<Percent>,
    ) -> Self {
        Self {
            id: None,
            contract_number: None,
            lessor_entity: String::new(),
            asset_type: None,
            asset_description: None,
            commencement_date,
            expiration_date,
            payment_interval,
            payment_timing: PaymentTiming::default(),
            base_payment,
            discount_rate_annual_percent,
            rate_table_id: None,
            is_low_value: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// Whole months covered by the lease: the smallest `m >= 1` such that
    /// commencement + m months reaches the expiration date. Both the
    /// "last day" (2026-12-31) and "next day" (2027-01-01) conventions for
    /// expiration give the same count.
    pub fn term_months(&self) -> LeaseEngineResult<u32> {
        if self.expiration_date <= self.commencement_date {
            return Err(LeaseEngineError::InvalidTerm(format!(
                "expiration {} must be after commencement {}",
                self.expiration_date, self.commencement_date
            )));
        }

        let start = self.commencement_date;
        let end = self.expiration_date;
        let calendar_months =
            (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
        let mut months = u32::try_from(calendar_months - 1).unwrap_or(0).max(1);
        while add_months(start, months)? < end {
            months += 1;
        }
        Ok(months)
    }

    /// Lease term in years, derived from `term_months`.
    pub fn term_years(&self) -> LeaseEngineResult<Years> {
        Ok(Decimal::from(self.term_months()?) / Decimal::from(12))
    }

    /// Copy of this record with the discount rate set.
    pub fn with_discount_rate(&self, annual_percent: Percent) -> Self {
        let mut lease = self.clone();
        lease.discount_rate_annual_percent = Some(annual_percent);
        lease
    }

    /// True when the record was edited after creation.
    pub fn is_modified(&self) -> bool {
        match (self.created_at, self.updated_at) {
            (Some(created), Some(updated)) => created != updated,
            _ => false,
        }
    }

    /// Structural checks the engine relies on. Missing discount rates are
    /// not an error here; they are the Rate Resolver's job.
    pub fn validate(&self) -> LeaseEngineResult<()> {
        self.term_months()?;
        if self.base_payment < Decimal::ZERO {
            return Err(LeaseEngineError::InvalidInput {
                field: "base_payment".into(),
                reason: "Base payment must be >= 0".into(),
            });
        }
        if let Some(rate) = self.discount_rate_annual_percent {
            if rate < Decimal::ZERO {
                return Err(LeaseEngineError::InvalidInput {
                    field: "discount_rate_annual_percent".into(),
                    reason: "Discount rate must be >= 0".into(),
                });
            }
        }
        Ok(())
    }
}

/// `date` plus `months` calendar months, clamping to month end.
pub(crate) fn add_months(date: NaiveDate, months: u32) -> LeaseEngineResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| LeaseEngineError::DateError(format!("{date} + {months} months is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lease(start: NaiveDate, end: NaiveDate) -> LeaseRecord {
        LeaseRecord::new(start, end, PaymentInterval::Monthly, dec!(1000), Some(dec!(5)))
    }

    #[test]
    fn test_term_months_last_day_and_next_day_conventions_agree() {
        let a = lease(date(2024, 1, 1), date(2026, 12, 31));
        let b = lease(date(2024, 1, 1), date(2027, 1, 1));
        assert_eq!(a.term_months().unwrap(), 36);
        assert_eq!(b.term_months().unwrap(), 36);
        assert_eq!(a.term_years().unwrap(), dec!(3));
    }

    #[test]
    fn test_term_months_partial_month_counts_as_whole() {
        let l = lease(date(2024, 1, 15), date(2024, 3, 10));
        assert_eq!(l.term_months().unwrap(), 2);
        let short = lease(date(2024, 5, 1), date(2024, 5, 2));
        assert_eq!(short.term_months().unwrap(), 1);
    }

    #[test]
    fn test_term_months_month_end_commencement() {
        let l = lease(date(2024, 1, 31), date(2024, 2, 29));
        assert_eq!(l.term_months().unwrap(), 1);
    }

    #[test]
    fn test_expiration_not_after_commencement_rejected() {
        let same = lease(date(2024, 1, 1), date(2024, 1, 1));
        assert!(matches!(same.term_months(), Err(LeaseEngineError::InvalidTerm(_))));
        let reversed = lease(date(2024, 6, 1), date(2024, 1, 1));
        assert!(reversed.validate().is_err());
    }

    #[test]
    fn test_negative_payment_rejected() {
        let mut l = lease(date(2024, 1, 1), date(2025, 1, 1));
        l.base_payment = dec!(-1);
        assert!(matches!(
            l.validate(),
            Err(LeaseEngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_interval_labels() {
        assert_eq!(PaymentInterval::from_label("Quarterly"), PaymentInterval::Quarterly);
        assert_eq!(PaymentInterval::from_label("yearly"), PaymentInterval::Annual);
        assert_eq!(PaymentInterval::from_label("weekly"), PaymentInterval::Monthly);
        assert_eq!(PaymentInterval::Quarterly.periods_per_year(), 4);
        assert_eq!(PaymentInterval::Annual.interval_months(), 12);
    }

    #[test]
    fn test_record_deserializes_with_defaults() {
        let json = r#"{
            "commencement_date": "2024-01-01",
            "expiration_date": "2026-12-31",
            "payment_interval": "quarterly",
            "base_payment": "10000"
        }"#;
        let l: LeaseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(l.payment_timing, PaymentTiming::End);
        assert_eq!(l.discount_rate_annual_percent, None);
        assert!(!l.is_low_value);
    }
}
