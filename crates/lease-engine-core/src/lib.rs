pub mod config;
pub mod error;
pub mod lease;
pub mod time_value;
pub mod types;

#[cfg(feature = "rates")]
pub mod rates;

#[cfg(feature = "schedule")]
pub mod schedule;

#[cfg(feature = "register")]
pub mod register;

pub use config::{RateConvention, ScheduleConfig};
pub use error::LeaseEngineError;
pub use lease::{LeaseRecord, PaymentFrequency, PaymentInterval, PaymentTiming};
pub use types::*;

/// Standard result type for all lease-engine operations
pub type LeaseEngineResult<T> = Result<T, LeaseEngineError>;
