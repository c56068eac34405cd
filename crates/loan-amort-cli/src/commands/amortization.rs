use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use loan_amort_core::amortization::emi;
use loan_amort_core::amortization::schedule::{self, LoanParameters};

use crate::input;

/// Arguments for full schedule generation
#[derive(Args)]
pub struct ScheduleArgs {
    /// Principal borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a decimal (e.g. 0.08 for 8%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan tenure in years
    #[arg(long)]
    pub tenure_years: Option<u32>,

    /// Extra EMI prepayments per year (0, 1, 2, 3, 4, 6 or 12)
    #[arg(long, default_value = "0")]
    pub extra_emi_per_year: u32,

    /// Annual EMI hike as a decimal (e.g. 0.05 for a 5% yearly increase)
    #[arg(long, default_value = "0")]
    pub emi_hike: Decimal,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the standard installment calculation
#[derive(Args)]
pub struct EmiArgs {
    /// Principal borrowed
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate as a decimal (e.g. 0.08 for 8%)
    #[arg(long)]
    pub rate: Decimal,

    /// Loan tenure in years
    #[arg(long)]
    pub tenure_years: u32,
}

/// Arguments for the no-prepayment baseline interest calculation
#[derive(Args)]
pub struct BaselineArgs {
    /// Principal borrowed
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate as a decimal (e.g. 0.08 for 8%)
    #[arg(long)]
    pub rate: Decimal,

    /// Loan tenure in years
    #[arg(long)]
    pub tenure_years: u32,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params: LoanParameters = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        LoanParameters {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            tenure_years: args
                .tenure_years
                .ok_or("--tenure-years is required (or provide --input)")?,
            extra_emi_per_year: args.extra_emi_per_year,
            emi_hike_rate: args.emi_hike,
        }
    };

    let result = schedule::generate_schedule(&params)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let installment = emi::standard_emi(args.principal, args.rate, args.tenure_years)?;
    Ok(json!({
        "standard_emi": installment,
        "total_months": args.tenure_years * 12,
    }))
}

pub fn run_baseline(args: BaselineArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let interest = emi::baseline_interest(args.principal, args.rate, args.tenure_years)?;
    Ok(json!({
        "baseline_interest": interest,
        "total_cost": args.principal + interest,
    }))
}
