use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use finplan_core::mortgage::comparison::{self, MortgageComparisonRequest};
use finplan_core::policy::PolicyParams;

use crate::input;

/// Arguments for the overpay-vs-invest comparison
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct MortgageArgs {
    /// Outstanding principal (PLN)
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 6.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Remaining term in months
    #[arg(long)]
    pub months: Option<u32>,

    /// Total monthly budget for mortgage plus investing (PLN)
    #[arg(long)]
    pub budget: Option<Decimal>,

    /// Expected annual investment return in percent
    #[arg(long, alias = "return")]
    pub expected_return: Option<Decimal>,

    /// Annual inflation in percent
    #[arg(long)]
    pub inflation: Option<Decimal>,

    /// Oscillate the mortgage rate over the repeating 10-year cycle
    #[arg(long)]
    pub variable_rate: bool,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_mortgage(args: MortgageArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: MortgageComparisonRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_piped()? {
        serde_json::from_value(data)?
    } else {
        MortgageComparisonRequest {
            remaining_principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_interest_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            remaining_months: args.months.ok_or("--months is required (or provide --input)")?,
            monthly_budget: args.budget.ok_or("--budget is required (or provide --input)")?,
            expected_annual_return: args
                .expected_return
                .ok_or("--expected-return is required (or provide --input)")?,
            inflation_rate: args.inflation.unwrap_or(dec!(2.5)),
            variable_rate: args.variable_rate,
            policy: PolicyParams::default(),
        }
    };

    let output = comparison::compare_mortgage_vs_invest(&request)?;
    Ok(serde_json::to_value(&output)?)
}
