//! PPK (Pracownicze Plany Kapitałowe) contribution and subsidy engine.
//!
//! PPK has no IKE/IKZE-style personal limit: contributions are a fixed
//! share of gross salary split between employee and employer, topped up by
//! a one-time welcome bonus and an income-conditioned annual state subsidy.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinPlanError;
use crate::policy::PolicyParams;
use crate::types::{pct, Money, Rate};
use crate::FinPlanResult;

/// Statutory bounds on the employee contribution rate (percent of salary).
pub const EMPLOYEE_RATE_MIN: Decimal = dec!(0.5);
pub const EMPLOYEE_RATE_MAX: Decimal = dec!(4.0);
/// Statutory bounds on the employer contribution rate (percent of salary).
pub const EMPLOYER_RATE_MIN: Decimal = dec!(1.5);
pub const EMPLOYER_RATE_MAX: Decimal = dec!(4.0);

/// Per-account PPK configuration. Rates are percentages of gross salary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PpkParams {
    pub monthly_gross_salary: Money,
    pub employee_rate: Decimal,
    pub employer_rate: Decimal,
    #[serde(default)]
    pub include_welcome_bonus: bool,
    #[serde(default)]
    pub include_annual_subsidy: bool,
    /// Caller's declaration that the participant qualifies for the reduced
    /// income band; cross-checked against the statutory threshold.
    #[serde(default)]
    pub salary_below_threshold: bool,
}

/// Expected annual return by age. PPK lifecycle funds shift from equities
/// into bonds as the participant approaches retirement.
pub fn lifecycle_return_for_age(age: u32) -> Rate {
    if age < 40 {
        dec!(0.07)
    } else if age < 50 {
        dec!(0.06)
    } else if age < 60 {
        dec!(0.05)
    } else {
        dec!(0.04)
    }
}

/// Validate one PPK account against statutory bounds. `field_prefix`
/// locates the account inside the request (e.g. `accounts[2]`).
pub fn validate(params: &PpkParams, policy: &PolicyParams, field_prefix: &str) -> FinPlanResult<()> {
    if params.monthly_gross_salary <= Decimal::ZERO {
        return Err(FinPlanError::InvalidInput {
            field: format!("{field_prefix}.monthly_gross_salary"),
            reason: "monthly gross salary must be > 0".into(),
        });
    }
    if params.employee_rate < EMPLOYEE_RATE_MIN || params.employee_rate > EMPLOYEE_RATE_MAX {
        return Err(FinPlanError::InvalidInput {
            field: format!("{field_prefix}.employee_rate"),
            reason: format!(
                "employee rate must be between {EMPLOYEE_RATE_MIN}% and {EMPLOYEE_RATE_MAX}%"
            ),
        });
    }
    if params.employer_rate < EMPLOYER_RATE_MIN || params.employer_rate > EMPLOYER_RATE_MAX {
        return Err(FinPlanError::InvalidInput {
            field: format!("{field_prefix}.employer_rate"),
            reason: format!(
                "employer rate must be between {EMPLOYER_RATE_MIN}% and {EMPLOYER_RATE_MAX}%"
            ),
        });
    }
    if params.salary_below_threshold && params.monthly_gross_salary > policy.ppk_salary_threshold {
        return Err(FinPlanError::InvalidInput {
            field: format!("{field_prefix}.salary_below_threshold"),
            reason: format!(
                "salary {} exceeds the {} PLN subsidy threshold",
                params.monthly_gross_salary, policy.ppk_salary_threshold
            ),
        });
    }
    Ok(())
}

/// Outcome of advancing one PPK account through one projection year.
#[derive(Debug, Clone)]
pub struct PpkYearOutcome {
    /// Employee + employer deposits over the 12 months
    pub contribution: Money,
    /// Welcome bonus and/or annual subsidy credited this year
    pub subsidies: Money,
    /// Balance after deposits, growth, and subsidies
    pub balance: Money,
    /// Gross lifecycle return applied this year, as a fraction
    pub return_rate: Rate,
}

/// Advance one PPK year: twelve monthly salary-split deposits compounding
/// at the fee-adjusted lifecycle rate, then subsidy credits.
///
/// The welcome bonus lands only in the first projection year; the annual
/// subsidy requires the salary-threshold flag and the statutory minimum of
/// own contributions for the year.
pub fn advance_year(
    balance: Money,
    monthly_salary: Money,
    params: &PpkParams,
    policy: &PolicyParams,
    age: u32,
    is_first_year: bool,
) -> PpkYearOutcome {
    let gross_annual = lifecycle_return_for_age(age);
    let net_monthly = (gross_annual - policy.ppk_fund_fee) / dec!(12);
    let monthly_contribution =
        monthly_salary * pct(params.employee_rate + params.employer_rate);

    let mut bal = balance;
    let mut contributed = Decimal::ZERO;
    for _ in 0..12 {
        bal += monthly_contribution;
        contributed += monthly_contribution;
        bal *= Decimal::ONE + net_monthly;
    }

    let mut subsidies = Decimal::ZERO;
    if is_first_year && params.include_welcome_bonus {
        subsidies += policy.ppk_welcome_bonus;
    }
    if params.include_annual_subsidy
        && params.salary_below_threshold
        && contributed >= policy.ppk_min_annual_contribution
    {
        subsidies += policy.ppk_annual_subsidy;
    }
    bal += subsidies;

    PpkYearOutcome {
        contribution: contributed,
        subsidies,
        balance: bal,
        return_rate: gross_annual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_params() -> PpkParams {
        PpkParams {
            monthly_gross_salary: dec!(5_000),
            employee_rate: dec!(2.0),
            employer_rate: dec!(1.5),
            include_welcome_bonus: true,
            include_annual_subsidy: true,
            salary_below_threshold: true,
        }
    }

    #[test]
    fn test_lifecycle_return_derisks_with_age() {
        assert_eq!(lifecycle_return_for_age(30), dec!(0.07));
        assert_eq!(lifecycle_return_for_age(40), dec!(0.06));
        assert_eq!(lifecycle_return_for_age(50), dec!(0.05));
        assert_eq!(lifecycle_return_for_age(60), dec!(0.04));
        assert_eq!(lifecycle_return_for_age(75), dec!(0.04));
    }

    #[test]
    fn test_annual_contribution_is_salary_split_times_twelve() {
        let params = sample_params();
        let outcome = advance_year(
            Decimal::ZERO,
            params.monthly_gross_salary,
            &params,
            &PolicyParams::default(),
            35,
            false,
        );
        // 5000 * 3.5% * 12
        assert_eq!(outcome.contribution, dec!(2_100));
    }

    #[test]
    fn test_welcome_bonus_first_year_only() {
        let params = sample_params();
        let policy = PolicyParams::default();
        let salary = params.monthly_gross_salary;

        let first = advance_year(Decimal::ZERO, salary, &params, &policy, 35, true);
        let later = advance_year(first.balance, salary, &params, &policy, 36, false);

        assert_eq!(first.subsidies, policy.ppk_welcome_bonus + policy.ppk_annual_subsidy);
        assert_eq!(later.subsidies, policy.ppk_annual_subsidy);
    }

    #[test]
    fn test_welcome_bonus_respects_flag() {
        let mut params = sample_params();
        params.include_welcome_bonus = false;
        let policy = PolicyParams::default();

        let first = advance_year(Decimal::ZERO, dec!(5_000), &params, &policy, 35, true);
        assert_eq!(first.subsidies, policy.ppk_annual_subsidy);
    }

    #[test]
    fn test_annual_subsidy_requires_threshold_flag() {
        let mut params = sample_params();
        params.include_annual_subsidy = true;
        params.salary_below_threshold = false;

        let outcome =
            advance_year(Decimal::ZERO, dec!(5_000), &params, &PolicyParams::default(), 35, false);
        assert_eq!(outcome.subsidies, Decimal::ZERO);
    }

    #[test]
    fn test_annual_subsidy_requires_minimum_contribution() {
        let mut params = sample_params();
        // 0.5% + 1.5% of 1000 PLN = 240/yr, below the 1009.26 floor
        params.monthly_gross_salary = dec!(1_000);
        params.employee_rate = dec!(0.5);
        params.employer_rate = dec!(1.5);

        let outcome =
            advance_year(Decimal::ZERO, dec!(1_000), &params, &PolicyParams::default(), 35, false);
        assert_eq!(outcome.subsidies, Decimal::ZERO);
    }

    #[test]
    fn test_balance_grows_with_net_return() {
        let params = sample_params();
        let outcome =
            advance_year(dec!(10_000), dec!(5_000), &params, &PolicyParams::default(), 35, false);
        // Deposits plus positive net growth on a positive balance
        assert!(outcome.balance > dec!(10_000) + outcome.contribution);
        assert_eq!(outcome.return_rate, dec!(0.07));
    }

    #[test]
    fn test_validate_rate_bounds() {
        let policy = PolicyParams::default();

        let mut low = sample_params();
        low.employee_rate = dec!(0.4);
        assert!(validate(&low, &policy, "accounts[0]").is_err());

        let mut high = sample_params();
        high.employer_rate = dec!(4.5);
        assert!(validate(&high, &policy, "accounts[0]").is_err());

        assert!(validate(&sample_params(), &policy, "accounts[0]").is_ok());
    }

    #[test]
    fn test_validate_threshold_consistency() {
        let policy = PolicyParams::default();
        let mut params = sample_params();
        params.monthly_gross_salary = dec!(9_000);
        params.salary_below_threshold = true;

        let err = validate(&params, &policy, "accounts[1]").unwrap_err();
        match err {
            FinPlanError::InvalidInput { field, .. } => {
                assert_eq!(field, "accounts[1].salary_below_threshold");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_rejects_nonpositive_salary() {
        let policy = PolicyParams::default();
        let mut params = sample_params();
        params.monthly_gross_salary = Decimal::ZERO;
        assert!(validate(&params, &policy, "accounts[0]").is_err());
    }
}
