use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::lease::LeaseRecord;

/// Criteria for narrowing the lease register. All set criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaseFilter {
    /// Case-insensitive match against lessor entity or contract number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    /// Keep leases not yet expired on this date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_on: Option<NaiveDate>,
    /// Keep leases edited after creation
    pub modified_only: bool,
    /// Keep leases flagged as low value
    pub low_value_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterLeasesInput {
    pub leases: Vec<LeaseRecord>,
    #[serde(default)]
    pub filter: LeaseFilter,
}

impl LeaseFilter {
    pub fn matches(&self, lease: &LeaseRecord) -> bool {
        if let Some(text) = self.search_text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let needle = text.to_lowercase();
            let in_lessor = lease.lessor_entity.to_lowercase().contains(&needle);
            let in_contract = lease
                .contract_number
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle));
            if !in_lessor && !in_contract {
                return false;
            }
        }
        if let Some(date) = self.active_on {
            if lease.expiration_date < date {
                return false;
            }
        }
        if self.modified_only && !lease.is_modified() {
            return false;
        }
        if self.low_value_only && !lease.is_low_value {
            return false;
        }
        true
    }
}

/// Leases matching `filter`, in their original order.
pub fn filter_leases<'a>(leases: &'a [LeaseRecord], filter: &LeaseFilter) -> Vec<&'a LeaseRecord> {
    leases.iter().filter(|l| filter.matches(l)).collect()
}
