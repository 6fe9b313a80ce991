mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::mortgage::MortgageArgs;
use commands::retirement::RetirementArgs;

/// Retirement and mortgage projections with decimal precision
#[derive(Parser)]
#[command(
    name = "finplan",
    version,
    about = "Retirement and mortgage projection calculations",
    long_about = "Project IKE/IKZE/PPK/brokerage balances year by year to retirement \
                  age, and compare accelerated mortgage repayment against investing \
                  the difference. All arithmetic is decimal, never floating point."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Project retirement accounts to retirement age
    Retirement(RetirementArgs),
    /// Compare mortgage overpayment against investing the difference
    Mortgage(MortgageArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Retirement(args) => commands::retirement::run_retirement(args),
        Commands::Mortgage(args) => commands::mortgage::run_mortgage(args),
        Commands::Version => {
            println!("finplan {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
