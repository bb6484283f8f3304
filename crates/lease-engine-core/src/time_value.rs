use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::config::RateConvention;
use crate::error::LeaseEngineError;
use crate::types::Rate;
use crate::LeaseEngineResult;

const NEWTON_ITERATIONS: u32 = 60;
const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000000000001);
const MAX_ANNUAL_RATE: Rate = dec!(100);

/// Convert a nominal annual rate (decimal) to the rate for one of
/// `periods_per_year` equal periods under the given convention.
pub fn periodic_rate(
    annual_rate: Rate,
    periods_per_year: u32,
    convention: RateConvention,
) -> LeaseEngineResult<Rate> {
    validate_annual_rate(annual_rate)?;
    if periods_per_year == 0 {
        return Err(LeaseEngineError::InvalidInput {
            field: "periods_per_year".into(),
            reason: "Number of periods per year must be > 0".into(),
        });
    }
    if periods_per_year == 1 || annual_rate.is_zero() {
        return Ok(annual_rate);
    }

    match convention {
        RateConvention::Compound => {
            Ok(nth_root(Decimal::ONE + annual_rate, periods_per_year) - Decimal::ONE)
        }
        RateConvention::Simple => Ok(annual_rate / Decimal::from(periods_per_year)),
    }
}

/// Effective annual yield of a periodic rate compounded `periods_per_year` times.
pub fn effective_annual_rate(periodic: Rate, periods_per_year: u32) -> Rate {
    let one_plus_r = Decimal::ONE + periodic;
    let mut growth = Decimal::ONE;
    for _ in 0..periods_per_year {
        growth *= one_plus_r;
    }
    growth - Decimal::ONE
}

/// Discount factor 1 / (1 + r)^n.
///
/// Built by repeated division so the factor shrinks toward zero for
/// positive rates instead of compounding past Decimal's range.
pub fn discount_factor(period_rate: Rate, periods: u32) -> LeaseEngineResult<Decimal> {
    if period_rate <= dec!(-1) {
        return Err(LeaseEngineError::InvalidInput {
            field: "period_rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }
    let one_plus_r = Decimal::ONE + period_rate;
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor = factor
            .checked_div(one_plus_r)
            .ok_or_else(|| LeaseEngineError::InvalidInput {
                field: "period_rate".into(),
                reason: format!("Discount factor out of range at {periods} periods"),
            })?;
    }
    Ok(factor)
}

/// Round a rate to `dp` decimal places, halves away from zero.
pub fn round_rate(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

pub(crate) fn validate_annual_rate(annual_rate: Rate) -> LeaseEngineResult<()> {
    if annual_rate <= dec!(-1) {
        return Err(LeaseEngineError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }
    if annual_rate > MAX_ANNUAL_RATE {
        return Err(LeaseEngineError::InvalidInput {
            field: "annual_rate".into(),
            reason: format!("Discount rate above {}% is not supported", MAX_ANNUAL_RATE * dec!(100)),
        });
    }
    Ok(())
}

/// Newton's method for the nth root of A.
/// x_{k+1} = ((n-1)*x_k + A / x_k^(n-1)) / n
///
/// Starts from the Bernoulli bound 1 + (A-1)/n, which is never below the
/// root, so iterates decrease monotonically and x^(n-1) cannot overflow.
fn nth_root(a: Decimal, n: u32) -> Decimal {
    if a <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if a == Decimal::ONE || n == 1 {
        return a;
    }
    let n_dec = Decimal::from(n);
    let n_minus_1 = n_dec - Decimal::ONE;

    let mut x = Decimal::ONE + (a - Decimal::ONE) / n_dec;

    for _ in 0..NEWTON_ITERATIONS {
        let mut x_pow = Decimal::ONE;
        for _ in 0..(n - 1) {
            x_pow *= x;
        }
        if x_pow.is_zero() {
            break;
        }
        let x_new = (n_minus_1 * x + a / x_pow) / n_dec;
        if (x_new - x).abs() < CONVERGENCE_THRESHOLD {
            return x_new;
        }
        x = x_new;
    }
    x
}
