//! Discount-rate selection state for a lease being entered or edited.
//!
//! Automatic resolution re-runs whenever the term, the payment frequency or
//! the selected table changes, but never replaces a rate the user typed in.
//! Only an explicit `refresh` goes back to the table.

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RateConvention;
use crate::error::LeaseEngineError;
use crate::lease::{LeaseRecord, PaymentFrequency, PaymentInterval};
use crate::types::{Percent, Years};
use crate::LeaseEngineResult;

use super::bucket::bucket_for_term;
use super::resolver::{convert_rate_percent, resolve_rate, ResolvedRate, RATE_DECIMAL_PLACES};
use super::table::RateTable;
use crate::time_value::round_rate;

/// Where the lease's discount rate currently comes from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RateSelection {
    #[default]
    Unset,
    AutoResolved(ResolvedRate),
    ManuallyOverridden { annual_rate_percent: Percent },
}

#[derive(Debug, Clone)]
pub struct DiscountRateSelector {
    term_years: Option<Years>,
    frequency: PaymentFrequency,
    convention: RateConvention,
    table: Option<RateTable>,
    selection: RateSelection,
}

impl DiscountRateSelector {
    pub fn new(frequency: PaymentFrequency, convention: RateConvention) -> Self {
        Self {
            term_years: None,
            frequency,
            convention,
            table: None,
            selection: RateSelection::Unset,
        }
    }

    /// Seed from a stored lease: a rate already on the record counts as a
    /// manual entry so that reopening the lease does not silently change it.
    pub fn for_lease(lease: &LeaseRecord, convention: RateConvention) -> LeaseEngineResult<Self> {
        let mut selector = Self::new(lease.payment_interval.frequency(), convention);
        selector.term_years = Some(lease.term_years()?);
        if let Some(rate) = lease.discount_rate_annual_percent {
            selector.selection = RateSelection::ManuallyOverridden {
                annual_rate_percent: rate,
            };
        }
        Ok(selector)
    }

    pub fn selection(&self) -> &RateSelection {
        &self.selection
    }

    pub fn table_id(&self) -> Option<&str> {
        self.table.as_ref().map(|t| t.id.as_str())
    }

    pub fn term_years(&self) -> Option<Years> {
        self.term_years
    }

    pub fn frequency(&self) -> PaymentFrequency {
        self.frequency
    }

    pub fn is_overridden(&self) -> bool {
        matches!(self.selection, RateSelection::ManuallyOverridden { .. })
    }

    pub fn select_table(&mut self, table: RateTable) -> LeaseEngineResult<&RateSelection> {
        self.table = Some(table);
        self.auto_resolve()
    }

    pub fn set_term(&mut self, term_years: Years) -> LeaseEngineResult<&RateSelection> {
        self.term_years = Some(term_years);
        self.auto_resolve()
    }

    pub fn set_frequency(&mut self, frequency: PaymentFrequency) -> LeaseEngineResult<&RateSelection> {
        self.frequency = frequency;
        self.auto_resolve()
    }

    pub fn set_interval(&mut self, interval: PaymentInterval) -> LeaseEngineResult<&RateSelection> {
        self.set_frequency(interval.frequency())
    }

    /// Take a manually entered annual rate. It sticks until `refresh`.
    pub fn override_rate(&mut self, annual_rate_percent: Percent) -> LeaseEngineResult<&RateSelection> {
        if annual_rate_percent < Decimal::ZERO {
            return Err(LeaseEngineError::InvalidInput {
                field: "annual_rate_percent".into(),
                reason: "Discount rate must be >= 0".into(),
            });
        }
        self.selection = RateSelection::ManuallyOverridden { annual_rate_percent };
        Ok(&self.selection)
    }

    /// Drop any manual override and resolve from the selected table again.
    pub fn refresh(&mut self) -> LeaseEngineResult<&RateSelection> {
        self.selection = RateSelection::Unset;
        self.auto_resolve()
    }

    /// Annual rate to store on the lease record, if one is selected.
    pub fn annual_rate_percent(&self) -> Option<Percent> {
        match &self.selection {
            RateSelection::Unset => None,
            RateSelection::AutoResolved(resolved) => Some(resolved.annual_rate_percent),
            RateSelection::ManuallyOverridden { annual_rate_percent } => Some(*annual_rate_percent),
        }
    }

    /// Per-period rate for display, rounded like a resolved rate.
    pub fn periodic_rate_percent(&self) -> LeaseEngineResult<Option<Percent>> {
        match &self.selection {
            RateSelection::Unset => Ok(None),
            RateSelection::AutoResolved(resolved) => Ok(Some(resolved.periodic_rate_percent)),
            RateSelection::ManuallyOverridden { annual_rate_percent } => {
                let converted =
                    convert_rate_percent(*annual_rate_percent, self.frequency, self.convention)?;
                Ok(Some(round_rate(converted, RATE_DECIMAL_PLACES)))
            }
        }
    }

    /// Copy of `lease` carrying the selected rate and table.
    pub fn apply_to(&self, lease: &LeaseRecord) -> LeaseEngineResult<LeaseRecord> {
        let rate = self
            .annual_rate_percent()
            .ok_or_else(|| LeaseEngineError::RateNotResolved {
                bucket: self
                    .term_years
                    .and_then(|t| bucket_for_term(t).ok())
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                reason: "no discount rate selected".into(),
            })?;
        let mut updated = lease.with_discount_rate(rate);
        if let RateSelection::AutoResolved(resolved) = &self.selection {
            updated.rate_table_id = Some(resolved.table_id.clone());
        }
        Ok(updated)
    }

    fn auto_resolve(&mut self) -> LeaseEngineResult<&RateSelection> {
        if self.is_overridden() {
            debug!("manual discount rate in place, skipping automatic resolution");
            return Ok(&self.selection);
        }
        let (Some(term), Some(table)) = (self.term_years, self.table.as_ref()) else {
            return Ok(&self.selection);
        };
        match resolve_rate(term, self.frequency, table, self.convention) {
            Ok(resolved) => {
                self.selection = RateSelection::AutoResolved(resolved);
                Ok(&self.selection)
            }
            Err(e) => {
                self.selection = RateSelection::Unset;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lease::PaymentInterval;
    use crate::rates::bucket::LeaseTermBucket;
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
                    yearly_rate_percent: dec!(4),
                },
                RateBucketEntry {
                    lease_term_bucket: LeaseTermBucket::ThreeToFive,
                    yearly_rate_percent: dec!(5),
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_resolves_once_term_and_table_known() {
        let mut selector = DiscountRateSelector::new(PaymentFrequency::Annual, RateConvention::Compound);
        assert_eq!(selector.select_table(table()).unwrap(), &RateSelection::Unset);
        selector.set_term(dec!(2)).unwrap();
        assert_eq!(selector.annual_rate_percent(), Some(dec!(4)));

        selector.set_term(dec!(4)).unwrap();
        assert_eq!(selector.annual_rate_percent(), Some(dec!(5)));
    }

    #[test]
    fn test_override_survives_input_changes_until_refresh() {
        let mut selector = DiscountRateSelector::new(PaymentFrequency::Monthly, RateConvention::Compound);
        selector.select_table(table()).unwrap();
        selector.set_term(dec!(2)).unwrap();
        selector.override_rate(dec!(6.5)).unwrap();

        selector.set_term(dec!(4)).unwrap();
        selector.set_frequency(PaymentFrequency::Quarterly).unwrap();
        selector.select_table(table()).unwrap();
        assert!(selector.is_overridden());
        assert_eq!(selector.annual_rate_percent(), Some(dec!(6.5)));

        selector.refresh().unwrap();
        assert!(!selector.is_overridden());
        assert_eq!(selector.annual_rate_percent(), Some(dec!(5)));
    }

    #[test]
    fn test_failed_resolution_leaves_selection_unset() {
        let mut selector = DiscountRateSelector::new(PaymentFrequency::Monthly, RateConvention::Compound);
        selector.select_table(table()).unwrap();
        selector.set_term(dec!(2)).unwrap();
        let err = selector.set_term(dec!(20)).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(selector.selection(), &RateSelection::Unset);
        assert_eq!(selector.annual_rate_percent(), None);
    }

    #[test]
    fn test_stored_rate_treated_as_manual() {
        let lease = LeaseRecord::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            PaymentInterval::Quarterly,
            dec!(10000),
            Some(dec!(7)),
        );
        let mut selector = DiscountRateSelector::for_lease(&lease, RateConvention::Compound).unwrap();
        selector.select_table(table()).unwrap();
        assert_eq!(selector.annual_rate_percent(), Some(dec!(7)));
        let applied = selector.apply_to(&lease).unwrap();
        assert_eq!(applied.discount_rate_annual_percent, Some(dec!(7)));
    }

    #[test]
    fn test_apply_records_table_for_auto_rate() {
        let lease = LeaseRecord::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            PaymentInterval::Quarterly,
            dec!(10000),
            None,
        );
        let mut selector = DiscountRateSelector::for_lease(&lease, RateConvention::Compound).unwrap();
        assert!(selector.apply_to(&lease).is_err());
        selector.select_table(table()).unwrap();
        let applied = selector.apply_to(&lease).unwrap();
        assert_eq!(applied.discount_rate_annual_percent, Some(dec!(4)));
        assert_eq!(applied.rate_table_id.as_deref(), Some("2024"));
        assert_eq!(selector.periodic_rate_percent().unwrap(), Some(dec!(0.9853)));
    }
}
