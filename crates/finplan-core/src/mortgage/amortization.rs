//! Fixed-payment amortization and the deterministic variable-rate cycle.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::FinPlanError;
use crate::policy::PolicyParams;
use crate::types::{Money, Rate};
use crate::FinPlanResult;

/// Level monthly payment that amortizes `principal` over `months` at the
/// given annual rate: `P * r(1+r)^n / ((1+r)^n - 1)` with `r` monthly.
/// Interest-free loans degenerate to straight-line `P/n`.
pub fn monthly_payment(principal: Money, annual_rate: Rate, months: u32) -> FinPlanResult<Money> {
    if months == 0 {
        return Err(FinPlanError::DivisionByZero {
            context: "monthly payment over zero remaining months".into(),
        });
    }
    let monthly_rate = annual_rate / dec!(12);
    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(months));
    }

    // (1 + r)^n via iterative multiplication
    let mut compound = Decimal::ONE;
    for _ in 0..months {
        compound *= Decimal::ONE + monthly_rate;
    }

    let numerator = principal * monthly_rate * compound;
    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Err(FinPlanError::DivisionByZero {
            context: "amortization payment denominator".into(),
        });
    }

    Ok(numerator / denominator)
}

/// Annual rate for 0-based `month` of the repeating variable-rate cycle.
///
/// Symmetric triangle wave: a linear ramp from the floor up to the ceiling
/// over the first half of the cycle, back down over the second half.
/// Deterministic and repeating with period `rate_cycle_months`.
pub fn cyclical_rate(month: u32, policy: &PolicyParams) -> Rate {
    let period = policy.rate_cycle_months;
    if period < 2 {
        return policy.rate_cycle_floor;
    }
    let half = period / 2;
    let phase = month % period;
    let span = policy.rate_cycle_ceiling - policy.rate_cycle_floor;

    if phase <= half {
        policy.rate_cycle_floor + span * Decimal::from(phase) / Decimal::from(half)
    } else {
        policy.rate_cycle_ceiling
            - span * Decimal::from(phase - half) / Decimal::from(period - half)
    }
}
