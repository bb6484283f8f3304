//! Discount-rate resolution.
//!
//! Maps a lease term onto one of the fixed term buckets, looks the bucket up
//! in a versioned rate table and converts the table's nominal annual rate
//! into a per-period rate for the payment frequency.

pub mod bucket;
pub mod resolver;
pub mod selector;
pub mod table;

pub use bucket::{bucket_for_term, LeaseTermBucket, LEASE_TERM_BUCKETS};
pub use resolver::{
    convert_rate_percent, payment_rate, resolve_for_lease, resolve_rate, ResolvedRate,
    RATE_DECIMAL_PLACES,
};
pub use selector::{DiscountRateSelector, RateSelection};
pub use table::{
    current_table, find_table, roll_registry, table_effective_on, RateBucketEntry, RateMatrixRow, RateTable,
};
