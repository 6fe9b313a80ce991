//! Statutory contribution-limit schedule for IKE/IKZE wrappers.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{compound, round_cents, Money, Rate};

/// Annual IKE contribution limit for the 2026 statutory year (PLN).
pub const DEFAULT_IKE_LIMIT: Decimal = dec!(28_260);
/// Annual IKZE contribution limit for the 2026 statutory year (PLN).
pub const DEFAULT_IKZE_LIMIT: Decimal = dec!(11_304);

/// Statutory limit `years_from_base` years after the base year:
/// `base_limit * (1 + growth_rate)^years_from_base`, rounded to cents.
///
/// Limits are announced annually and historically track wage growth; the
/// caller supplies the growth assumption. Negative offsets are unrepresentable.
pub fn projected_limit(base_limit: Money, growth_rate: Rate, years_from_base: u32) -> Money {
    round_cents(base_limit * compound(growth_rate, years_from_base))
}
