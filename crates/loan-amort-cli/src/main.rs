mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::{BaselineArgs, EmiArgs, ScheduleArgs};

/// Loan amortisation and prepayment planning
#[derive(Parser)]
#[command(
    name = "emi",
    version,
    about = "Loan amortisation and prepayment planning",
    long_about = "A CLI for computing loan amortisation schedules with decimal \
                  precision. Supports prepayment strategies (periodic extra EMIs \
                  and annual EMI hikes), no-prepayment baselines, and savings \
                  summaries."
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
    /// Generate a full amortisation schedule under a prepayment strategy
    Schedule(ScheduleArgs),
    /// Calculate the standard monthly installment for a loan
    Emi(EmiArgs),
    /// Total interest over the full tenure with no prepayments
    Baseline(BaselineArgs),
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
        Commands::Schedule(args) => commands::amortization::run_schedule(args),
        Commands::Emi(args) => commands::amortization::run_emi(args),
        Commands::Baseline(args) => commands::amortization::run_baseline(args),
        Commands::Version => {
            println!("emi {}", env!("CARGO_PKG_VERSION"));
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
