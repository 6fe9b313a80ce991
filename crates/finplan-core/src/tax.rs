//! Capital-gains and purchasing-power adjustments.
//!
//! Both functions are pure and applied at read/report time; simulated
//! nominal balances stay the source of truth.

use rust_decimal::Decimal;

use crate::types::{compound, Money, Rate};

/// Net gain after flat capital-gains tax. Losses are passed through
/// untaxed, never negative-taxed.
pub fn after_tax_gain(gross_gain: Money, tax_rate: Rate) -> Money {
    if gross_gain <= Decimal::ZERO {
        return gross_gain;
    }
    gross_gain * (Decimal::ONE - tax_rate)
}

/// Balance after settling capital-gains tax on withdrawal. Tax applies to
/// the gain portion only (`balance - cumulative_contributions`), never to
/// principal.
pub fn after_tax_balance(
    balance: Money,
    cumulative_contributions: Money,
    tax_rate: Rate,
) -> Money {
    let gain = (balance - cumulative_contributions).max(Decimal::ZERO);
    balance - gain * tax_rate
}

/// Deflate a nominal amount to present-day purchasing power:
/// `nominal / (1 + inflation)^years`.
pub fn real_value(nominal: Money, inflation_rate: Rate, years_elapsed: u32) -> Money {
    nominal / compound(inflation_rate, years_elapsed)
}
