//! Lease register queries over in-memory lease records.

pub mod filters;

pub use filters::{filter_leases, FilterLeasesInput, LeaseFilter};
