//! Annual contribution planning for limit-bound wrappers (IKE/IKZE).
//!
//! PPK is salary-rate-driven and never passes through this planner; see
//! [`crate::retirement::ppk`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Money;

/// How an IKE/IKZE account is funded each year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ContributionStrategy {
    /// A fixed monthly deposit, capped at the statutory limit.
    FixedMonthly { monthly: Money },
    /// Deposit exactly the remaining limit capacity each year.
    AutoFillLimit,
}

/// The year's planned contribution given the remaining limit capacity.
///
/// Fixed-monthly deposits above the cap are silently capped, mirroring how
/// providers refuse over-limit transfers; the cap is surfaced to the caller
/// through [`limit_utilization_pct`]. Exhausted capacity yields zero.
pub fn planned_contribution(strategy: &ContributionStrategy, remaining_capacity: Money) -> Money {
    let capacity = remaining_capacity.max(Decimal::ZERO);
    match strategy {
        ContributionStrategy::FixedMonthly { monthly } => (monthly * dec!(12)).min(capacity),
        ContributionStrategy::AutoFillLimit => capacity,
    }
}

/// Share of the annual limit used, as a display percentage capped at 100.
pub fn limit_utilization_pct(contribution: Money, limit: Money) -> Decimal {
    if limit <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (contribution / limit * dec!(100)).min(dec!(100))
}
