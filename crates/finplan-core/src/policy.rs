use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Statutory and model constants the projections depend on.
///
/// Defaults carry the 2026 Polish values. Every request type embeds a
/// `PolicyParams` with `#[serde(default)]`, so callers override individual
/// fields instead of patching constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyParams {
    /// One-time PPK welcome bonus, credited in the first projection year (PLN)
    pub ppk_welcome_bonus: Money,
    /// Annual PPK state subsidy (PLN)
    pub ppk_annual_subsidy: Money,
    /// Monthly gross salary ceiling for annual-subsidy eligibility,
    /// 120% of the minimum wage (PLN)
    pub ppk_salary_threshold: Money,
    /// Minimum employee+employer contributions in a year to earn the
    /// annual subsidy (PLN)
    pub ppk_min_annual_contribution: Money,
    /// Annual PPK fund management fee, as a fraction
    pub ppk_fund_fee: Rate,
    /// Flat capital-gains (Belka) tax rate, as a fraction
    pub capital_gains_tax: Rate,
    /// Safe-withdrawal fraction for retirement-income estimates
    pub safe_withdrawal_rate: Rate,
    /// Length of the variable mortgage-rate cycle in months
    pub rate_cycle_months: u32,
    /// Annual-rate floor of the variable cycle, as a fraction
    pub rate_cycle_floor: Rate,
    /// Annual-rate ceiling of the variable cycle, as a fraction
    pub rate_cycle_ceiling: Rate,
}

impl Default for PolicyParams {
    fn default() -> Self {
        PolicyParams {
            ppk_welcome_bonus: dec!(250),
            ppk_annual_subsidy: dec!(240),
            ppk_salary_threshold: dec!(5767.20),
            ppk_min_annual_contribution: dec!(1009.26),
            ppk_fund_fee: dec!(0.006),
            capital_gains_tax: dec!(0.19),
            safe_withdrawal_rate: dec!(0.04),
            rate_cycle_months: 120,
            rate_cycle_floor: dec!(0.01),
            rate_cycle_ceiling: dec!(0.08),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_statutory_values() {
        let policy = PolicyParams::default();
        assert_eq!(policy.ppk_welcome_bonus, dec!(250));
        assert_eq!(policy.ppk_annual_subsidy, dec!(240));
        assert_eq!(policy.capital_gains_tax, dec!(0.19));
        assert_eq!(policy.safe_withdrawal_rate, dec!(0.04));
        assert_eq!(policy.rate_cycle_months, 120);
    }

    #[test]
    fn test_partial_override_via_serde_default() {
        let policy: PolicyParams =
            serde_json::from_str(r#"{"capital_gains_tax": "0.20"}"#).unwrap();
        assert_eq!(policy.capital_gains_tax, dec!(0.20));
        // Untouched fields keep statutory defaults
        assert_eq!(policy.ppk_annual_subsidy, dec!(240));
    }
}
