use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LeaseEngineError;
use crate::types::Years;
use crate::LeaseEngineResult;

/// Lease-term range that a rate table prices separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeaseTermBucket {
    #[serde(rename = "1-3 year")]
    UpToThree,
    #[serde(rename = "3-5 year")]
    ThreeToFive,
    #[serde(rename = "5-10 year")]
    FiveToTen,
    #[serde(rename = "10-15 year")]
    TenToFifteen,
    #[serde(rename = "15-30 year")]
    FifteenToThirty,
    #[serde(rename = ">30 year")]
    OverThirty,
}

/// Every bucket, shortest term first.
pub const LEASE_TERM_BUCKETS: [LeaseTermBucket; 6] = [
    LeaseTermBucket::UpToThree,
    LeaseTermBucket::ThreeToFive,
    LeaseTermBucket::FiveToTen,
    LeaseTermBucket::TenToFifteen,
    LeaseTermBucket::FifteenToThirty,
    LeaseTermBucket::OverThirty,
];

impl LeaseTermBucket {
    pub fn label(self) -> &'static str {
        match self {
            LeaseTermBucket::UpToThree => "1-3 year",
            LeaseTermBucket::ThreeToFive => "3-5 year",
            LeaseTermBucket::FiveToTen => "5-10 year",
            LeaseTermBucket::TenToFifteen => "10-15 year",
            LeaseTermBucket::FifteenToThirty => "15-30 year",
            LeaseTermBucket::OverThirty => ">30 year",
        }
    }

    /// Inclusive upper bound of the bucket in years; `None` for the last one.
    pub fn upper_bound(self) -> Option<Years> {
        match self {
            LeaseTermBucket::UpToThree => Some(dec!(3)),
            LeaseTermBucket::ThreeToFive => Some(dec!(5)),
            LeaseTermBucket::FiveToTen => Some(dec!(10)),
            LeaseTermBucket::TenToFifteen => Some(dec!(15)),
            LeaseTermBucket::FifteenToThirty => Some(dec!(30)),
            LeaseTermBucket::OverThirty => None,
        }
    }

    pub fn contains(self, term: Years) -> bool {
        bucket_for_term(term).map(|b| b == self).unwrap_or(false)
    }
}

impl fmt::Display for LeaseTermBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LeaseTermBucket {
    type Err = LeaseEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LEASE_TERM_BUCKETS
            .iter()
            .copied()
            .find(|b| b.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| LeaseEngineError::InvalidInput {
                field: "lease_term_bucket".into(),
                reason: format!("Unknown lease term bucket '{s}'"),
            })
    }
}

/// Select the bucket for a lease term in years. Upper bounds are
/// inclusive and the first matching bucket wins, so every positive term
/// maps to exactly one bucket.
pub fn bucket_for_term(term: Years) -> LeaseEngineResult<LeaseTermBucket> {
    if term <= Decimal::ZERO {
        return Err(LeaseEngineError::InvalidTerm(format!(
            "lease term must be > 0 years, got {term}"
        )));
    }
    let bucket = LEASE_TERM_BUCKETS
        .iter()
        .copied()
        .find(|b| b.upper_bound().map_or(true, |upper| term <= upper))
        .unwrap_or(LeaseTermBucket::OverThirty);
    Ok(bucket)
}
