//! Overpay-the-mortgage versus invest-the-difference comparison.
//!
//! Both scenarios spend the same fixed monthly budget for the whole
//! remaining term: scenario A throws it all at the mortgage and invests
//! the budget once the loan is gone; scenario B pays only the regular
//! installment and invests the residual every month.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinPlanError;
use crate::mortgage::amortization::{cyclical_rate, monthly_payment};
use crate::policy::PolicyParams;
use crate::tax::{after_tax_balance, real_value};
use crate::types::{pct, round_cents, with_metadata, ComputationOutput, Money, Rate};
use crate::FinPlanResult;

/// Balances below this are treated as paid off (cent-level noise).
const BALANCE_EPSILON: Decimal = dec!(0.005);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Comparator input. Rates are percentages (6.5 = 6.5%).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageComparisonRequest {
    pub remaining_principal: Money,
    pub annual_interest_rate: Decimal,
    pub remaining_months: u32,
    /// Total amount available every month for mortgage plus investing
    pub monthly_budget: Money,
    pub expected_annual_return: Decimal,
    pub inflation_rate: Decimal,
    /// Replace the fixed rate with the repeating variable-rate cycle
    #[serde(default)]
    pub variable_rate: bool,
    #[serde(default)]
    pub policy: PolicyParams,
}

/// One scenario's state at a year boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioYear {
    pub mortgage_balance: Money,
    pub mortgage_balance_real: Money,
    pub cumulative_interest: Money,
    pub investment_balance: Money,
    pub investment_after_tax: Money,
    pub investment_real: Money,
    pub paid_off: bool,
}

/// Paired year row for both scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageYearRow {
    pub year: u32,
    pub scenario_a: ScenarioYear,
    pub scenario_b: ScenarioYear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinningStrategy {
    /// Scenario A: accelerated mortgage repayment
    Overpay,
    /// Scenario B: regular installments, difference invested
    Invest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageSummary {
    /// Regular (non-accelerated) installment at the starting rate
    pub regular_monthly_payment: Money,
    pub total_interest_a: Money,
    pub total_interest_b: Money,
    /// Interest scenario A avoids versus the regular schedule
    pub interest_saved: Money,
    /// Months scenario A finishes ahead of the no-extra-budget baseline
    pub months_saved: u32,
    /// Scenario B's gross portfolio at the end of the term
    pub final_investment_balance: Money,
    pub belka_tax_a: Money,
    pub belka_tax_b: Money,
    /// Final after-tax, inflation-deflated net position per scenario
    pub final_real_value_a: Money,
    pub final_real_value_b: Money,
    pub winning_strategy: WinningStrategy,
    /// Absolute difference between the two net positions
    pub net_advantage: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageComparisonResponse {
    pub yearly_projections: Vec<MortgageYearRow>,
    pub summary: MortgageSummary,
}

// ---------------------------------------------------------------------------
// Scenario state
// ---------------------------------------------------------------------------

/// Mutable per-scenario accumulator threaded through the month loop.
struct Leg {
    balance: Money,
    interest: Money,
    investment: Money,
    invested: Money,
    paid_off_month: Option<u32>,
}

impl Leg {
    fn new(principal: Money) -> Self {
        Leg {
            balance: principal,
            interest: Decimal::ZERO,
            investment: Decimal::ZERO,
            invested: Decimal::ZERO,
            paid_off_month: None,
        }
    }

    /// Deposit this month's contribution, then apply one month of growth.
    fn invest(&mut self, contribution: Money, monthly_return: Rate) {
        self.investment = (self.investment + contribution) * (Decimal::ONE + monthly_return);
        self.invested += contribution;
    }

    fn year_view(&self, year: u32, inflation: Rate, policy: &PolicyParams) -> ScenarioYear {
        let after_tax = after_tax_balance(self.investment, self.invested, policy.capital_gains_tax);
        ScenarioYear {
            mortgage_balance: round_cents(self.balance),
            mortgage_balance_real: round_cents(real_value(self.balance, inflation, year)),
            cumulative_interest: round_cents(self.interest),
            investment_balance: round_cents(self.investment),
            investment_after_tax: round_cents(after_tax),
            investment_real: round_cents(real_value(after_tax, inflation, year)),
            paid_off: self.paid_off_month.is_some(),
        }
    }

    /// After-tax, deflated portfolio minus any deflated residual debt.
    fn net_position(&self, inflation: Rate, years: u32, policy: &PolicyParams) -> Money {
        let after_tax = after_tax_balance(self.investment, self.invested, policy.capital_gains_tax);
        real_value(after_tax, inflation, years) - real_value(self.balance, inflation, years)
    }

    fn belka_paid(&self, policy: &PolicyParams) -> Money {
        (self.investment - self.invested).max(Decimal::ZERO) * policy.capital_gains_tax
    }
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Run both scenarios over the remaining term and declare a winner.
///
/// On exact equality of the final net positions scenario A wins: clearing
/// the debt carries risk-reduction value the figures do not capture.
pub fn compare_mortgage_vs_invest(
    request: &MortgageComparisonRequest,
) -> FinPlanResult<ComputationOutput<MortgageComparisonResponse>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_request(request)?;

    let policy = &request.policy;
    let months = request.remaining_months;
    let fixed_rate = pct(request.annual_interest_rate);
    let invest_monthly = pct(request.expected_annual_return) / dec!(12);
    let inflation = pct(request.inflation_rate);

    let initial_rate = if request.variable_rate {
        cyclical_rate(0, policy)
    } else {
        fixed_rate
    };
    let initial_regular = monthly_payment(request.remaining_principal, initial_rate, months)?;
    if request.monthly_budget < initial_regular {
        return Err(FinPlanError::InvalidInput {
            field: "monthly_budget".into(),
            reason: format!(
                "budget {} does not cover the required regular payment {}",
                request.monthly_budget,
                round_cents(initial_regular)
            ),
        });
    }

    let mut a = Leg::new(request.remaining_principal);
    let mut b = Leg::new(request.remaining_principal);
    let mut regular_payment = initial_regular;
    let mut current_rate = initial_rate;
    let mut budget_warning_issued = false;
    let mut rows: Vec<MortgageYearRow> = Vec::with_capacity(((months + 11) / 12) as usize);

    for month in 0..months {
        if request.variable_rate {
            let rate = cyclical_rate(month, policy);
            if rate != current_rate {
                current_rate = rate;
                // Re-amortize the regular schedule over what is left of the
                // original term so scheduled payoff stays on the maturity date.
                if b.balance > BALANCE_EPSILON {
                    regular_payment = monthly_payment(b.balance, current_rate, months - month)?;
                }
            }
        }
        let monthly_rate = current_rate / dec!(12);

        // Scenario A: the whole budget services the mortgage until payoff,
        // then becomes a monthly investment contribution.
        let a_contribution = if a.paid_off_month.is_none() {
            let interest = a.balance * monthly_rate;
            a.interest += interest;
            let due = a.balance + interest;
            if interest >= request.monthly_budget && !budget_warning_issued {
                warnings.push(format!(
                    "budget no longer covers interest in month {} under the variable-rate path",
                    month + 1
                ));
                budget_warning_issued = true;
            }
            let payment = request.monthly_budget.min(due);
            a.balance = due - payment;
            if a.balance <= BALANCE_EPSILON {
                a.balance = Decimal::ZERO;
                a.paid_off_month = Some(month + 1);
            }
            // Whatever the payoff month does not consume is invested
            request.monthly_budget - payment
        } else {
            request.monthly_budget
        };
        a.invest(a_contribution, invest_monthly);

        // Scenario B: regular installment only, residual budget invested.
        let b_contribution = if b.paid_off_month.is_none() {
            let interest = b.balance * monthly_rate;
            b.interest += interest;
            let due = b.balance + interest;
            let payment = regular_payment.min(due);
            b.balance = due - payment;
            if b.balance <= BALANCE_EPSILON {
                b.balance = Decimal::ZERO;
                b.paid_off_month = Some(month + 1);
            }
            let residual = request.monthly_budget - payment;
            if residual < Decimal::ZERO {
                if !budget_warning_issued {
                    warnings.push(format!(
                        "re-amortized payment exceeds the budget in month {}; nothing invested that month",
                        month + 1
                    ));
                    budget_warning_issued = true;
                }
                Decimal::ZERO
            } else {
                residual
            }
        } else {
            request.monthly_budget
        };
        b.invest(b_contribution, invest_monthly);

        if a.balance < Decimal::ZERO || b.balance < Decimal::ZERO {
            return Err(FinPlanError::InvariantViolation {
                context: "mortgage comparison".into(),
                detail: format!("negative mortgage balance in month {}", month + 1),
            });
        }

        let elapsed_months = month + 1;
        if elapsed_months % 12 == 0 || elapsed_months == months {
            let year = (elapsed_months + 11) / 12;
            rows.push(MortgageYearRow {
                year,
                scenario_a: a.year_view(year, inflation, policy),
                scenario_b: b.year_view(year, inflation, policy),
            });
        }
    }

    let years_total = (months + 11) / 12;
    let a_net = a.net_position(inflation, years_total, policy);
    let b_net = b.net_position(inflation, years_total, policy);
    let winning_strategy = if a_net >= b_net {
        WinningStrategy::Overpay
    } else {
        WinningStrategy::Invest
    };

    let total_interest_a = round_cents(a.interest);
    let total_interest_b = round_cents(b.interest);
    let summary = MortgageSummary {
        regular_monthly_payment: round_cents(initial_regular),
        total_interest_a,
        total_interest_b,
        interest_saved: total_interest_b - total_interest_a,
        months_saved: a.paid_off_month.map(|m| months - m).unwrap_or(0),
        final_investment_balance: round_cents(b.investment),
        belka_tax_a: round_cents(a.belka_paid(policy)),
        belka_tax_b: round_cents(b.belka_paid(policy)),
        final_real_value_a: round_cents(a_net),
        final_real_value_b: round_cents(b_net),
        winning_strategy,
        net_advantage: round_cents((a_net - b_net).abs()),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Accelerated-repayment vs invest-the-difference comparison (shared monthly budget)",
        &serde_json::json!({
            "remaining_principal": request.remaining_principal.to_string(),
            "annual_interest_rate_pct": request.annual_interest_rate.to_string(),
            "remaining_months": request.remaining_months,
            "monthly_budget": request.monthly_budget.to_string(),
            "expected_annual_return_pct": request.expected_annual_return.to_string(),
            "variable_rate": request.variable_rate,
        }),
        warnings,
        elapsed,
        MortgageComparisonResponse {
            yearly_projections: rows,
            summary,
        },
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_request(request: &MortgageComparisonRequest) -> FinPlanResult<()> {
    if request.remaining_principal <= Decimal::ZERO {
        return Err(FinPlanError::InvalidInput {
            field: "remaining_principal".into(),
            reason: "principal must be > 0".into(),
        });
    }
    if request.remaining_months == 0 {
        return Err(FinPlanError::InvalidInput {
            field: "remaining_months".into(),
            reason: "remaining term must be at least one month".into(),
        });
    }
    if request.annual_interest_rate < Decimal::ZERO || request.annual_interest_rate > dec!(50) {
        return Err(FinPlanError::InvalidInput {
            field: "annual_interest_rate".into(),
            reason: "interest rate must be between 0% and 50%".into(),
        });
    }
    if request.expected_annual_return < Decimal::ZERO || request.expected_annual_return > dec!(50) {
        return Err(FinPlanError::InvalidInput {
            field: "expected_annual_return".into(),
            reason: "expected return must be between 0% and 50%".into(),
        });
    }
    if request.inflation_rate < dec!(-50) || request.inflation_rate > dec!(50) {
        return Err(FinPlanError::InvalidInput {
            field: "inflation_rate".into(),
            reason: "inflation must be between -50% and 50%".into(),
        });
    }
    if request.monthly_budget <= Decimal::ZERO {
        return Err(FinPlanError::InvalidInput {
            field: "monthly_budget".into(),
            reason: "monthly budget must be > 0".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
