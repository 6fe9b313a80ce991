//! Year-by-year growth simulation across retirement wrappers, plus the
//! cross-account summary.
//!
//! Contribution-timing policy: the year's contribution is added first and
//! the nominal return applies to `balance + contribution` (deposits are
//! treated as available for the full year, not dollar-cost-averaged).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinPlanError;
use crate::policy::PolicyParams;
use crate::retirement::contributions::{
    limit_utilization_pct, planned_contribution, ContributionStrategy,
};
use crate::retirement::limits::{projected_limit, DEFAULT_IKE_LIMIT, DEFAULT_IKZE_LIMIT};
use crate::retirement::ppk::{self, PpkParams};
use crate::tax::{after_tax_gain, real_value};
use crate::types::{pct, round_cents, with_metadata, ComputationOutput, Money, Rate};
use crate::FinPlanResult;

/// Widest plausible band for caller-supplied percentage rates.
const RATE_PCT_MIN: Decimal = dec!(-50);
const RATE_PCT_MAX: Decimal = dec!(50);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Wrapper-specific configuration. One variant per wrapper kind: adding a
/// wrapper means adding a variant here and an arm in `simulate_account`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "wrapper", rename_all = "UPPERCASE")]
pub enum WrapperParams {
    /// Tax-free wrapper with an annual statutory limit
    Ike { strategy: ContributionStrategy },
    /// Limit-bound wrapper granting immediate relief at the marginal rate
    /// (percentage, e.g. 17.0)
    Ikze {
        strategy: ContributionStrategy,
        marginal_tax_rate: Decimal,
    },
    /// Employer-sponsored plan, salary-rate-driven, no personal limit
    Ppk(PpkParams),
    /// Taxable account: no limit, no relief, gains taxed as they accrue
    Brokerage { monthly_contribution: Money },
}

impl WrapperParams {
    fn label(&self) -> &'static str {
        match self {
            WrapperParams::Ike { .. } => "IKE",
            WrapperParams::Ikze { .. } => "IKZE",
            WrapperParams::Ppk(_) => "PPK",
            WrapperParams::Brokerage { .. } => "Brokerage",
        }
    }
}

/// One account to project, as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub owner: String,
    pub starting_balance: Money,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    #[serde(flatten)]
    pub params: WrapperParams,
}

fn enabled_default() -> bool {
    true
}

/// Macro assumptions shared by every account. Rates are percentages
/// (7.0 = 7%), converted to fractions at the simulation boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assumptions {
    pub current_age: u32,
    pub retirement_age: u32,
    pub annual_return_rate: Decimal,
    pub limit_growth_rate: Decimal,
    pub salary_growth_rate: Decimal,
    pub inflation_rate: Decimal,
    /// Current-year IKE statutory limit; defaults to [`DEFAULT_IKE_LIMIT`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ike_base_limit: Option<Money>,
    /// Current-year IKZE statutory limit; defaults to [`DEFAULT_IKZE_LIMIT`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ikze_base_limit: Option<Money>,
}

impl Assumptions {
    pub fn years_to_retirement(&self) -> u32 {
        self.retirement_age - self.current_age
    }
}

/// A full simulation request: the engine's entire input surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub accounts: Vec<AccountConfig>,
    pub assumptions: Assumptions,
    #[serde(default)]
    pub policy: PolicyParams,
}

/// Projection for a single account year. Limit fields are absent for
/// wrappers without a statutory limit; salary and return-rate fields are
/// PPK-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlyProjection {
    pub year: u32,
    pub age: u32,
    pub annual_contribution: Money,
    pub balance_end_of_year: Money,
    pub cumulative_contributions: Money,
    pub cumulative_returns: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_limit: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_utilized_pct: Option<Decimal>,
    pub tax_savings: Money,
    pub government_subsidies: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_salary: Option<Money>,
    /// Gross lifecycle return applied this year, as a percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_rate: Option<Decimal>,
}

/// Simulation results for a single account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSimulation {
    pub account_name: String,
    pub starting_balance: Money,
    pub total_contributions: Money,
    pub total_returns: Money,
    pub total_tax_savings: Money,
    pub total_subsidies: Money,
    pub final_balance: Money,
    pub yearly_projections: Vec<YearlyProjection>,
}

/// Cross-account rollup, including 4%-rule income estimates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub total_final_balance: Money,
    pub total_contributions: Money,
    pub total_returns: Money,
    pub total_tax_savings: Money,
    pub total_subsidies: Money,
    pub estimated_monthly_income: Money,
    pub estimated_monthly_income_today: Money,
    pub years_until_retirement: u32,
}

/// Complete simulation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub simulations: Vec<AccountSimulation>,
    pub summary: SimulationSummary,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Project every enabled account to retirement age and roll the results up.
///
/// The whole request is validated before any account simulates: either the
/// full projection succeeds or the caller gets a single structured
/// rejection, never partial output.
pub fn run_simulation(
    request: &SimulationRequest,
) -> FinPlanResult<ComputationOutput<SimulationResponse>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_request(request)?;

    let simulations = request
        .accounts
        .iter()
        .filter(|account| account.enabled)
        .map(|account| simulate_account(account, &request.assumptions, &request.policy))
        .collect::<FinPlanResult<Vec<AccountSimulation>>>()?;

    if simulations.is_empty() {
        warnings.push("No enabled accounts; summary is all zeros".into());
    }

    let summary = summarize(&simulations, &request.assumptions, &request.policy);
    let response = SimulationResponse {
        simulations,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Multi-wrapper retirement projection (IKE/IKZE/PPK/brokerage, 4%-rule summary)",
        &serde_json::json!({
            "accounts": request.accounts.len(),
            "current_age": request.assumptions.current_age,
            "retirement_age": request.assumptions.retirement_age,
            "annual_return_rate_pct": request.assumptions.annual_return_rate.to_string(),
            "limit_growth_rate_pct": request.assumptions.limit_growth_rate.to_string(),
            "inflation_rate_pct": request.assumptions.inflation_rate.to_string(),
        }),
        warnings,
        elapsed,
        response,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_rate_pct(value: Decimal, field: &str) -> FinPlanResult<()> {
    if value < RATE_PCT_MIN || value > RATE_PCT_MAX {
        return Err(FinPlanError::InvalidInput {
            field: field.into(),
            reason: format!("rate must be between {RATE_PCT_MIN}% and {RATE_PCT_MAX}%"),
        });
    }
    Ok(())
}

fn validate_request(request: &SimulationRequest) -> FinPlanResult<()> {
    let a = &request.assumptions;
    if a.retirement_age <= a.current_age {
        return Err(FinPlanError::InvalidInput {
            field: "retirement_age".into(),
            reason: "retirement age must be greater than current age".into(),
        });
    }
    validate_rate_pct(a.annual_return_rate, "annual_return_rate")?;
    validate_rate_pct(a.limit_growth_rate, "limit_growth_rate")?;
    validate_rate_pct(a.salary_growth_rate, "salary_growth_rate")?;
    validate_rate_pct(a.inflation_rate, "inflation_rate")?;

    for (idx, account) in request.accounts.iter().enumerate() {
        let prefix = format!("accounts[{idx}]");
        if account.starting_balance < Decimal::ZERO {
            return Err(FinPlanError::InvalidInput {
                field: format!("{prefix}.starting_balance"),
                reason: "starting balance must be >= 0".into(),
            });
        }
        match &account.params {
            WrapperParams::Ike { strategy } => validate_strategy(strategy, &prefix)?,
            WrapperParams::Ikze {
                strategy,
                marginal_tax_rate,
            } => {
                validate_strategy(strategy, &prefix)?;
                if *marginal_tax_rate < Decimal::ZERO || *marginal_tax_rate > dec!(100) {
                    return Err(FinPlanError::InvalidInput {
                        field: format!("{prefix}.marginal_tax_rate"),
                        reason: "marginal tax rate must be between 0% and 100%".into(),
                    });
                }
            }
            WrapperParams::Ppk(params) => ppk::validate(params, &request.policy, &prefix)?,
            WrapperParams::Brokerage {
                monthly_contribution,
            } => {
                if *monthly_contribution < Decimal::ZERO {
                    return Err(FinPlanError::InvalidInput {
                        field: format!("{prefix}.monthly_contribution"),
                        reason: "monthly contribution must be >= 0".into(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn validate_strategy(strategy: &ContributionStrategy, prefix: &str) -> FinPlanResult<()> {
    if let ContributionStrategy::FixedMonthly { monthly } = strategy {
        if *monthly < Decimal::ZERO {
            return Err(FinPlanError::InvalidInput {
                field: format!("{prefix}.strategy.monthly"),
                reason: "monthly contribution must be >= 0".into(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Per-wrapper simulation
// ---------------------------------------------------------------------------

/// Carried state for the year-over-year fold: the only values one year
/// hands to the next.
struct Carry {
    balance: Money,
    contributions: Money,
    returns: Money,
    relief: Money,
    subsidies: Money,
}

impl Carry {
    fn new(starting_balance: Money) -> Self {
        Carry {
            balance: starting_balance,
            contributions: Decimal::ZERO,
            returns: Decimal::ZERO,
            relief: Decimal::ZERO,
            subsidies: Decimal::ZERO,
        }
    }
}

fn simulate_account(
    account: &AccountConfig,
    assumptions: &Assumptions,
    policy: &PolicyParams,
) -> FinPlanResult<AccountSimulation> {
    match &account.params {
        WrapperParams::Ike { strategy } => {
            let base = assumptions.ike_base_limit.unwrap_or(DEFAULT_IKE_LIMIT);
            simulate_limited(account, strategy, None, base, assumptions)
        }
        WrapperParams::Ikze {
            strategy,
            marginal_tax_rate,
        } => {
            let base = assumptions.ikze_base_limit.unwrap_or(DEFAULT_IKZE_LIMIT);
            simulate_limited(account, strategy, Some(pct(*marginal_tax_rate)), base, assumptions)
        }
        WrapperParams::Ppk(params) => simulate_ppk(account, params, assumptions, policy),
        WrapperParams::Brokerage {
            monthly_contribution,
        } => simulate_brokerage(account, *monthly_contribution, assumptions, policy),
    }
}

/// IKE/IKZE: limit-bound annual contributions, optional immediate relief.
fn simulate_limited(
    account: &AccountConfig,
    strategy: &ContributionStrategy,
    relief_rate: Option<Rate>,
    base_limit: Money,
    assumptions: &Assumptions,
) -> FinPlanResult<AccountSimulation> {
    let years = assumptions.years_to_retirement();
    let return_rate = pct(assumptions.annual_return_rate);
    let limit_growth = pct(assumptions.limit_growth_rate);

    let mut carry = Carry::new(account.starting_balance);
    let mut rows = Vec::with_capacity(years as usize);

    for offset in 0..years {
        // The base limit belongs to the current year; the first projected
        // year is already one growth step out.
        let limit = projected_limit(base_limit, limit_growth, offset + 1);
        let contribution = planned_contribution(strategy, limit);
        let gross_return = (carry.balance + contribution) * return_rate;
        let relief = relief_rate
            .map(|rate| contribution * rate)
            .unwrap_or(Decimal::ZERO);

        carry.balance += contribution + gross_return;
        carry.contributions += contribution;
        carry.returns += gross_return;
        carry.relief += relief;
        check_balance(carry.balance, account)?;

        rows.push(YearlyProjection {
            year: offset + 1,
            age: assumptions.current_age + offset + 1,
            annual_contribution: round_cents(contribution),
            balance_end_of_year: round_cents(carry.balance),
            cumulative_contributions: round_cents(carry.contributions),
            cumulative_returns: round_cents(carry.returns),
            annual_limit: Some(limit),
            limit_utilized_pct: Some(round_cents(limit_utilization_pct(contribution, limit))),
            tax_savings: round_cents(relief),
            government_subsidies: Decimal::ZERO,
            monthly_salary: None,
            return_rate: None,
        });
    }

    Ok(finish_account(account, carry, rows))
}

/// PPK: monthly salary-split deposits, lifecycle returns, state subsidies.
fn simulate_ppk(
    account: &AccountConfig,
    params: &PpkParams,
    assumptions: &Assumptions,
    policy: &PolicyParams,
) -> FinPlanResult<AccountSimulation> {
    let years = assumptions.years_to_retirement();
    let salary_growth = pct(assumptions.salary_growth_rate);

    let mut carry = Carry::new(account.starting_balance);
    let mut monthly_salary = params.monthly_gross_salary;
    let mut rows = Vec::with_capacity(years as usize);

    for offset in 0..years {
        let age_during_year = assumptions.current_age + offset;
        let outcome = ppk::advance_year(
            carry.balance,
            monthly_salary,
            params,
            policy,
            age_during_year,
            offset == 0,
        );

        let year_return = outcome.balance - carry.balance - outcome.contribution - outcome.subsidies;
        carry.balance = outcome.balance;
        carry.contributions += outcome.contribution;
        carry.subsidies += outcome.subsidies;
        carry.returns += year_return;
        check_balance(carry.balance, account)?;

        rows.push(YearlyProjection {
            year: offset + 1,
            age: assumptions.current_age + offset + 1,
            annual_contribution: round_cents(outcome.contribution),
            balance_end_of_year: round_cents(carry.balance),
            cumulative_contributions: round_cents(carry.contributions),
            cumulative_returns: round_cents(carry.returns),
            annual_limit: None,
            limit_utilized_pct: None,
            tax_savings: Decimal::ZERO,
            government_subsidies: round_cents(outcome.subsidies),
            monthly_salary: Some(round_cents(monthly_salary)),
            return_rate: Some(outcome.return_rate * dec!(100)),
        });

        monthly_salary *= Decimal::ONE + salary_growth;
    }

    Ok(finish_account(account, carry, rows))
}

/// Brokerage: unlimited contributions, Belka tax deducted from each year's
/// gross return as it accrues.
fn simulate_brokerage(
    account: &AccountConfig,
    monthly_contribution: Money,
    assumptions: &Assumptions,
    policy: &PolicyParams,
) -> FinPlanResult<AccountSimulation> {
    let years = assumptions.years_to_retirement();
    let return_rate = pct(assumptions.annual_return_rate);
    let annual_contribution = monthly_contribution * dec!(12);

    let mut carry = Carry::new(account.starting_balance);
    let mut rows = Vec::with_capacity(years as usize);

    for offset in 0..years {
        let gross_return = (carry.balance + annual_contribution) * return_rate;
        let net_return = after_tax_gain(gross_return, policy.capital_gains_tax);

        carry.balance += annual_contribution + net_return;
        carry.contributions += annual_contribution;
        carry.returns += net_return;
        check_balance(carry.balance, account)?;

        rows.push(YearlyProjection {
            year: offset + 1,
            age: assumptions.current_age + offset + 1,
            annual_contribution: round_cents(annual_contribution),
            balance_end_of_year: round_cents(carry.balance),
            cumulative_contributions: round_cents(carry.contributions),
            cumulative_returns: round_cents(carry.returns),
            annual_limit: None,
            limit_utilized_pct: None,
            tax_savings: Decimal::ZERO,
            government_subsidies: Decimal::ZERO,
            monthly_salary: None,
            return_rate: None,
        });
    }

    Ok(finish_account(account, carry, rows))
}

fn finish_account(account: &AccountConfig, carry: Carry, rows: Vec<YearlyProjection>) -> AccountSimulation {
    AccountSimulation {
        account_name: format!("{} ({})", account.params.label(), account.owner),
        starting_balance: round_cents(account.starting_balance),
        total_contributions: round_cents(carry.contributions),
        total_returns: round_cents(carry.returns),
        total_tax_savings: round_cents(carry.relief),
        total_subsidies: round_cents(carry.subsidies),
        final_balance: round_cents(carry.balance),
        yearly_projections: rows,
    }
}

/// A negative balance cannot arise from validated inputs; if it ever does,
/// the projection is corrupt and must fail loudly rather than clamp.
fn check_balance(balance: Money, account: &AccountConfig) -> FinPlanResult<()> {
    if balance < Decimal::ZERO {
        return Err(FinPlanError::InvariantViolation {
            context: format!("{} ({})", account.params.label(), account.owner),
            detail: format!("balance went negative mid-simulation: {balance}"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Pure reduction over per-account results. Zero accounts roll up to an
/// all-zero summary, not an error.
fn summarize(
    simulations: &[AccountSimulation],
    assumptions: &Assumptions,
    policy: &PolicyParams,
) -> SimulationSummary {
    let years = assumptions.years_to_retirement();
    let total_final = simulations
        .iter()
        .fold(Decimal::ZERO, |acc, s| acc + s.final_balance);
    let total_contributions = simulations
        .iter()
        .fold(Decimal::ZERO, |acc, s| acc + s.total_contributions);
    let total_returns = simulations
        .iter()
        .fold(Decimal::ZERO, |acc, s| acc + s.total_returns);
    let total_tax_savings = simulations
        .iter()
        .fold(Decimal::ZERO, |acc, s| acc + s.total_tax_savings);
    let total_subsidies = simulations
        .iter()
        .fold(Decimal::ZERO, |acc, s| acc + s.total_subsidies);

    let monthly_income = total_final * policy.safe_withdrawal_rate / dec!(12);
    let monthly_income_today =
        real_value(monthly_income, pct(assumptions.inflation_rate), years);

    SimulationSummary {
        total_final_balance: round_cents(total_final),
        total_contributions: round_cents(total_contributions),
        total_returns: round_cents(total_returns),
        total_tax_savings: round_cents(total_tax_savings),
        total_subsidies: round_cents(total_subsidies),
        estimated_monthly_income: round_cents(monthly_income),
        estimated_monthly_income_today: round_cents(monthly_income_today),
        years_until_retirement: years,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base_assumptions(years: u32) -> Assumptions {
        Assumptions {
            current_age: 35,
            retirement_age: 35 + years,
            annual_return_rate: dec!(7),
            limit_growth_rate: dec!(5),
            salary_growth_rate: dec!(3),
            inflation_rate: dec!(2.5),
            ike_base_limit: None,
            ikze_base_limit: None,
        }
    }

    fn ikze_account(monthly: Decimal, tax_rate: Decimal) -> AccountConfig {
        AccountConfig {
            owner: "Marcin".into(),
            starting_balance: Decimal::ZERO,
            enabled: true,
            params: WrapperParams::Ikze {
                strategy: ContributionStrategy::FixedMonthly { monthly },
                marginal_tax_rate: tax_rate,
            },
        }
    }

    fn request(accounts: Vec<AccountConfig>, assumptions: Assumptions) -> SimulationRequest {
        SimulationRequest {
            accounts,
            assumptions,
            policy: PolicyParams::default(),
        }
    }

    // ---------------------------------------------------------------
    // 1. End-to-end IKZE: 500/mo, 17% relief, 7% return, 10 years
    // ---------------------------------------------------------------
    #[test]
    fn test_ikze_end_to_end_contributions_and_relief() {
        let req = request(vec![ikze_account(dec!(500), dec!(17))], base_assumptions(10));
        let out = run_simulation(&req).unwrap();
        let sim = &out.result.simulations[0];

        assert_eq!(sim.yearly_projections.len(), 10);
        // Never capped: year-1 limit is 11304 * 1.05 = 11869.20, well above 6000
        assert_eq!(sim.total_contributions, dec!(60_000));
        assert_eq!(sim.total_tax_savings, dec!(0.17) * dec!(60_000));
        let last = sim.yearly_projections.last().unwrap();
        assert_eq!(last.cumulative_contributions, dec!(60_000));
    }

    // ---------------------------------------------------------------
    // 2. Cumulative contributions are non-decreasing and sum the years
    // ---------------------------------------------------------------
    #[test]
    fn test_cumulative_contributions_monotonic() {
        let req = request(vec![ikze_account(dec!(700), dec!(32))], base_assumptions(20));
        let out = run_simulation(&req).unwrap();
        let rows = &out.result.simulations[0].yearly_projections;

        let mut prev = Decimal::ZERO;
        let mut sum = Decimal::ZERO;
        for row in rows {
            assert!(row.cumulative_contributions >= prev);
            prev = row.cumulative_contributions;
            sum += row.annual_contribution;
        }
        assert_eq!(rows.last().unwrap().cumulative_contributions, sum);
    }

    // ---------------------------------------------------------------
    // 3. Auto-fill hits exactly 100% utilization every year
    // ---------------------------------------------------------------
    #[test]
    fn test_auto_fill_full_utilization() {
        let account = AccountConfig {
            owner: "Ewa".into(),
            starting_balance: dec!(10_000),
            enabled: true,
            params: WrapperParams::Ike {
                strategy: ContributionStrategy::AutoFillLimit,
            },
        };
        let out = run_simulation(&request(vec![account], base_assumptions(5))).unwrap();

        for row in &out.result.simulations[0].yearly_projections {
            assert_eq!(row.limit_utilized_pct, Some(dec!(100)));
            assert_eq!(Some(row.annual_contribution), row.annual_limit);
        }
    }

    // ---------------------------------------------------------------
    // 4. Fixed-monthly above the limit is capped, utilization shows 100
    // ---------------------------------------------------------------
    #[test]
    fn test_fixed_monthly_capped_at_limit() {
        // 2000/mo = 24000/yr against an IKZE cap near 11.9k
        let req = request(vec![ikze_account(dec!(2_000), dec!(17))], base_assumptions(3));
        let out = run_simulation(&req).unwrap();

        for row in &out.result.simulations[0].yearly_projections {
            assert_eq!(Some(row.annual_contribution), row.annual_limit);
            assert_eq!(row.limit_utilized_pct, Some(dec!(100)));
        }
    }

    // ---------------------------------------------------------------
    // 5. Utilization never exceeds 100 for any limit-bound account
    // ---------------------------------------------------------------
    #[test]
    fn test_utilization_bounded() {
        let accounts = vec![
            ikze_account(dec!(400), dec!(12)),
            AccountConfig {
                owner: "Ewa".into(),
                starting_balance: Decimal::ZERO,
                enabled: true,
                params: WrapperParams::Ike {
                    strategy: ContributionStrategy::FixedMonthly { monthly: dec!(5_000) },
                },
            },
        ];
        let out = run_simulation(&request(accounts, base_assumptions(12))).unwrap();

        for sim in &out.result.simulations {
            for row in &sim.yearly_projections {
                assert!(row.limit_utilized_pct.unwrap() <= dec!(100));
            }
        }
    }

    // ---------------------------------------------------------------
    // 6. Year identity: end = (start + contribution) * (1 + r)
    // ---------------------------------------------------------------
    #[test]
    fn test_yearly_balance_identity() {
        let req = request(vec![ikze_account(dec!(500), dec!(17))], base_assumptions(10));
        let out = run_simulation(&req).unwrap();
        let rows = &out.result.simulations[0].yearly_projections;

        let mut start = Decimal::ZERO;
        for row in rows {
            let expected = (start + row.annual_contribution) * dec!(1.07);
            assert!(
                (row.balance_end_of_year - expected).abs() < dec!(0.02),
                "year {}: {} vs {}",
                row.year,
                row.balance_end_of_year,
                expected
            );
            start = row.balance_end_of_year;
        }
    }

    // ---------------------------------------------------------------
    // 7. IKE reports no relief
    // ---------------------------------------------------------------
    #[test]
    fn test_ike_no_tax_savings() {
        let account = AccountConfig {
            owner: "Marcin".into(),
            starting_balance: dec!(5_000),
            enabled: true,
            params: WrapperParams::Ike {
                strategy: ContributionStrategy::FixedMonthly { monthly: dec!(800) },
            },
        };
        let out = run_simulation(&request(vec![account], base_assumptions(8))).unwrap();
        let sim = &out.result.simulations[0];

        assert_eq!(sim.total_tax_savings, Decimal::ZERO);
        assert!(sim.yearly_projections.iter().all(|r| r.tax_savings.is_zero()));
    }

    // ---------------------------------------------------------------
    // 8. PPK: salary-driven contributions growing geometrically
    // ---------------------------------------------------------------
    #[test]
    fn test_ppk_salary_driven_contributions() {
        let account = AccountConfig {
            owner: "Ewa".into(),
            starting_balance: Decimal::ZERO,
            enabled: true,
            params: WrapperParams::Ppk(PpkParams {
                monthly_gross_salary: dec!(5_000),
                employee_rate: dec!(2.0),
                employer_rate: dec!(1.5),
                include_welcome_bonus: true,
                include_annual_subsidy: true,
                salary_below_threshold: true,
            }),
        };
        let out = run_simulation(&request(vec![account], base_assumptions(4))).unwrap();
        let rows = &out.result.simulations[0].yearly_projections;

        // Year 1: 5000 * 3.5% * 12
        assert_eq!(rows[0].annual_contribution, dec!(2_100));
        assert_eq!(rows[0].monthly_salary, Some(dec!(5_000)));
        // Year 2 salary grew 3%
        assert_eq!(rows[1].monthly_salary, Some(dec!(5_150)));
        assert_eq!(rows[1].annual_contribution, dec!(2_163));
        // Welcome bonus + annual subsidy in year 1, subsidy alone later
        assert_eq!(rows[0].government_subsidies, dec!(490));
        assert_eq!(rows[1].government_subsidies, dec!(240));
        // Limit fields are not applicable for PPK
        assert!(rows.iter().all(|r| r.annual_limit.is_none()));
        assert!(rows.iter().all(|r| r.limit_utilized_pct.is_none()));
        assert_eq!(rows[0].return_rate, Some(dec!(7.00)));
    }

    // ---------------------------------------------------------------
    // 9. Brokerage: Belka tax shaves each year's return
    // ---------------------------------------------------------------
    #[test]
    fn test_brokerage_returns_net_of_tax() {
        let account = AccountConfig {
            owner: "Marcin".into(),
            starting_balance: dec!(10_000),
            enabled: true,
            params: WrapperParams::Brokerage {
                monthly_contribution: dec!(1_000),
            },
        };
        let out = run_simulation(&request(vec![account], base_assumptions(1))).unwrap();
        let row = &out.result.simulations[0].yearly_projections[0];

        // Gross return 7% of 22_000, taxed at 19%
        let gross = dec!(22_000) * dec!(0.07);
        assert_eq!(row.cumulative_returns, round_cents(gross * dec!(0.81)));
        assert!(row.annual_limit.is_none());
        assert_eq!(row.tax_savings, Decimal::ZERO);
    }

    // ---------------------------------------------------------------
    // 10. Disabled accounts vanish from results and totals
    // ---------------------------------------------------------------
    #[test]
    fn test_disabled_accounts_excluded() {
        let mut disabled = ikze_account(dec!(500), dec!(17));
        disabled.enabled = false;
        let enabled = AccountConfig {
            owner: "Ewa".into(),
            starting_balance: dec!(1_000),
            enabled: true,
            params: WrapperParams::Ike {
                strategy: ContributionStrategy::FixedMonthly { monthly: dec!(100) },
            },
        };
        let out = run_simulation(&request(vec![disabled, enabled], base_assumptions(5))).unwrap();

        assert_eq!(out.result.simulations.len(), 1);
        assert_eq!(out.result.simulations[0].account_name, "IKE (Ewa)");
        // Totals reflect only the enabled account
        assert_eq!(out.result.summary.total_contributions, dec!(6_000));
    }

    // ---------------------------------------------------------------
    // 11. Zero enabled accounts: all-zero summary, not an error
    // ---------------------------------------------------------------
    #[test]
    fn test_zero_accounts_zero_summary() {
        let out = run_simulation(&request(vec![], base_assumptions(10))).unwrap();

        assert!(out.result.simulations.is_empty());
        assert_eq!(out.result.summary.total_final_balance, Decimal::ZERO);
        assert_eq!(out.result.summary.estimated_monthly_income, Decimal::ZERO);
        assert!(!out.warnings.is_empty());
    }

    // ---------------------------------------------------------------
    // 12. Summary: 4%-rule income, nominal and deflated
    // ---------------------------------------------------------------
    #[test]
    fn test_summary_four_percent_rule() {
        let req = request(vec![ikze_account(dec!(500), dec!(17))], base_assumptions(10));
        let out = run_simulation(&req).unwrap();
        let summary = &out.result.summary;

        let expected_income =
            round_cents(summary.total_final_balance * dec!(0.04) / dec!(12));
        assert_eq!(summary.estimated_monthly_income, expected_income);
        assert!(summary.estimated_monthly_income_today < summary.estimated_monthly_income);
        assert_eq!(summary.years_until_retirement, 10);
    }

    // ---------------------------------------------------------------
    // 13. Validation: retirement age must exceed current age
    // ---------------------------------------------------------------
    #[test]
    fn test_rejects_retirement_age_not_after_current() {
        let mut assumptions = base_assumptions(10);
        assumptions.retirement_age = assumptions.current_age;
        let err = run_simulation(&request(vec![], assumptions)).unwrap_err();

        match err {
            FinPlanError::InvalidInput { field, .. } => assert_eq!(field, "retirement_age"),
            other => panic!("unexpected error: {other}"),
        }
    }

    // ---------------------------------------------------------------
    // 14. Validation is atomic: one bad account fails the whole request
    // ---------------------------------------------------------------
    #[test]
    fn test_validation_atomic_across_accounts() {
        let good = ikze_account(dec!(500), dec!(17));
        let bad = AccountConfig {
            owner: "Ewa".into(),
            starting_balance: Decimal::ZERO,
            enabled: true,
            params: WrapperParams::Ppk(PpkParams {
                monthly_gross_salary: dec!(5_000),
                employee_rate: dec!(0.1), // below statutory floor
                employer_rate: dec!(1.5),
                include_welcome_bonus: false,
                include_annual_subsidy: false,
                salary_below_threshold: false,
            }),
        };
        let err = run_simulation(&request(vec![good, bad], base_assumptions(10))).unwrap_err();

        match err {
            FinPlanError::InvalidInput { field, .. } => {
                assert_eq!(field, "accounts[1].employee_rate");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    // ---------------------------------------------------------------
    // 15. Validation: negative starting balance and out-of-band rates
    // ---------------------------------------------------------------
    #[test]
    fn test_rejects_negative_balance_and_wild_rates() {
        let mut account = ikze_account(dec!(500), dec!(17));
        account.starting_balance = dec!(-1);
        assert!(run_simulation(&request(vec![account], base_assumptions(10))).is_err());

        let mut assumptions = base_assumptions(10);
        assumptions.annual_return_rate = dec!(75);
        assert!(run_simulation(&request(vec![], assumptions)).is_err());
    }

    // ---------------------------------------------------------------
    // 16. Request deserializes from the wire shape
    // ---------------------------------------------------------------
    #[test]
    fn test_request_wire_format() {
        let json = r#"{
            "accounts": [
                {
                    "owner": "Marcin",
                    "starting_balance": "12000",
                    "wrapper": "IKZE",
                    "strategy": {"mode": "fixed_monthly", "monthly": "500"},
                    "marginal_tax_rate": "17"
                },
                {
                    "owner": "Ewa",
                    "starting_balance": "0",
                    "enabled": false,
                    "wrapper": "PPK",
                    "monthly_gross_salary": "5000",
                    "employee_rate": "2.0",
                    "employer_rate": "1.5",
                    "salary_below_threshold": true
                }
            ],
            "assumptions": {
                "current_age": 35,
                "retirement_age": 65,
                "annual_return_rate": "7",
                "limit_growth_rate": "5",
                "salary_growth_rate": "3",
                "inflation_rate": "2.5"
            }
        }"#;
        let req: SimulationRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.accounts.len(), 2);
        assert!(req.accounts[0].enabled, "enabled defaults to true");
        assert!(!req.accounts[1].enabled);
        assert_eq!(req.policy.capital_gains_tax, dec!(0.19));

        let out = run_simulation(&req).unwrap();
        assert_eq!(out.result.simulations.len(), 1);
        assert_eq!(out.result.simulations[0].account_name, "IKZE (Marcin)");
    }

    // ---------------------------------------------------------------
    // 17. Determinism: identical inputs, identical projections
    // ---------------------------------------------------------------
    #[test]
    fn test_deterministic_results() {
        let req = request(vec![ikze_account(dec!(500), dec!(17))], base_assumptions(25));
        let a = run_simulation(&req).unwrap();
        let b = run_simulation(&req).unwrap();

        assert_eq!(
            serde_json::to_value(&a.result).unwrap(),
            serde_json::to_value(&b.result).unwrap()
        );
    }
}
