//! Engine configuration shared by rate resolution and schedule generation.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Money;

/// How a nominal annual rate is turned into a per-period rate.
///
/// The same convention is applied to rate resolution, present-value
/// discounting and monthly interest accrual.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateConvention {
    /// Effective periodic rate: (1 + r)^(1/p) - 1
    #[default]
    Compound,
    /// Pro-rata periodic rate: r / p
    Simple,
}

/// Tunables for a schedule run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Periodic-rate convention
    pub rate_convention: RateConvention,
    /// Largest final closing liability (absolute) accepted without a warning
    pub closing_tolerance: Money,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            rate_convention: RateConvention::Compound,
            closing_tolerance: dec!(0.01),
        }
    }
}

impl ScheduleConfig {
    pub fn with_convention(mut self, convention: RateConvention) -> Self {
        self.rate_convention = convention;
        self
    }

    pub fn with_closing_tolerance(mut self, tolerance: Money) -> Self {
        self.closing_tolerance = tolerance.abs();
        self
    }

    pub(crate) fn within_tolerance(&self, amount: Money) -> bool {
        amount.abs() <= self.closing_tolerance.max(Decimal::ZERO)
    }
}
