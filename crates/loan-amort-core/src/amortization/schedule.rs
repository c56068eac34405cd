//! Prepayment amortisation schedules.
//!
//! The core month-by-month simulation: interest accrual against the current
//! balance, annual EMI hikes, fixed extra-EMI prepayments, and early payoff,
//! plus the summary comparison against the no-prepayment baseline.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::emi::{
    baseline_interest, monthly_interest, standard_emi, MONTHS_PER_YEAR,
};
use crate::error::LoanAmortError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::LoanAmortResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Loan terms and prepayment strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Principal borrowed.
    pub principal: Money,
    /// Annual interest rate (e.g., 0.08 = 8%).
    pub annual_rate: Rate,
    /// Loan tenure in years.
    pub tenure_years: u32,
    /// Extra EMI prepayments per year. Must divide the year evenly:
    /// 0, 1, 2, 3, 4, 6 or 12.
    pub extra_emi_per_year: u32,
    /// Annual EMI hike applied from year 2 onward (e.g., 0.05 = 5%).
    pub emi_hike_rate: Rate,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One month of the amortisation schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyRecord {
    /// Month index, 1-based and sequential.
    pub month: u32,
    /// Installment paid this month (reduced in the payoff month).
    pub emi: Money,
    /// Portion of the installment retiring principal.
    pub toward_principal: Money,
    /// Portion of the installment covering interest.
    pub toward_interest: Money,
    /// Balance remaining after this month's payments.
    pub outstanding_balance: Money,
    /// Extra payment applied this month; zero when none fired.
    pub prepayment: Money,
    /// True exactly when this month cleared the balance.
    pub paid_off: bool,
}

/// Aggregate comparison against the no-prepayment baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// Principal borrowed.
    pub principal: Money,
    /// Total interest over the full tenure with no prepayments.
    pub interest_without_prepayment: Money,
    /// Interest actually accrued under the prepayment strategy.
    pub interest_with_prepayment: Money,
    /// Principal plus baseline interest.
    pub total_cost_without_prepayment: Money,
    /// Principal plus actual interest.
    pub total_cost_with_prepayment: Money,
    /// Baseline interest minus actual interest.
    pub money_saved: Money,
    /// Whole years to payoff, floored.
    pub payoff_years: u32,
    /// Exact months to payoff.
    pub payoff_months: u32,
}

/// Full schedule output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    /// The unhiked annuity installment the strategy starts from.
    pub standard_emi: Money,
    /// Per-month records, month 1 upward, ending at payoff or tenure.
    pub records: Vec<MonthlyRecord>,
    /// Aggregate metrics derived from the records.
    pub summary: ScheduleSummary,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate the amortisation schedule for `params` and summarise it against
/// the no-prepayment baseline.
pub fn generate_schedule(
    params: &LoanParameters,
) -> LoanAmortResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();

    validate(params)?;
    let mut warnings = collect_warnings(params);

    let base_emi = standard_emi(params.principal, params.annual_rate, params.tenure_years)?;
    let baseline = baseline_interest(params.principal, params.annual_rate, params.tenure_years)?;

    let (records, interest_paid) = simulate(params, base_emi);
    let summary = summarise(params, baseline, interest_paid, records.len() as u32);

    if summary.money_saved < Decimal::ZERO {
        warnings.push("Prepayment strategy accrues more interest than the baseline".into());
    }

    let output = ScheduleOutput {
        standard_emi: base_emi,
        records,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Prepayment EMI Amortisation",
        params,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

fn simulate(params: &LoanParameters, base_emi: Money) -> (Vec<MonthlyRecord>, Money) {
    let total_months = params.tenure_years * MONTHS_PER_YEAR;
    let prepay_interval = if params.extra_emi_per_year > 0 {
        MONTHS_PER_YEAR / params.extra_emi_per_year
    } else {
        0
    };

    let mut records: Vec<MonthlyRecord> = Vec::with_capacity(total_months as usize);
    let mut outstanding = params.principal;
    let mut running_emi = base_emi;
    let mut total_interest = Decimal::ZERO;
    let mut last_hiked_year = 1u32;

    let mut month = 1u32;
    while outstanding > Decimal::ZERO && month <= total_months {
        // The hike fires on the first month of years 2, 3, ... and compounds
        // on the running installment. Year 1 is never hiked.
        let year = (month - 1) / MONTHS_PER_YEAR + 1;
        if params.emi_hike_rate > Decimal::ZERO && year > last_hiked_year {
            running_emi *= Decimal::ONE + params.emi_hike_rate;
            last_hiked_year = year;
        }

        let interest = monthly_interest(outstanding, params.annual_rate);
        total_interest += interest;

        let mut principal_portion = running_emi - interest;
        let mut emi_paid = running_emi;
        if principal_portion > outstanding {
            // Payoff month: no overpayment is recorded, and the running
            // installment itself is left untouched.
            principal_portion = outstanding;
            emi_paid = principal_portion + interest;
        }

        // The prepayment stays pegged to the original installment, not the
        // hiked one, and never pushes the balance below zero.
        let mut prepayment = Decimal::ZERO;
        if prepay_interval > 0 && month % prepay_interval == 0 {
            prepayment = base_emi;
            let headroom = outstanding - principal_portion;
            if prepayment > headroom {
                prepayment = headroom;
            }
        }

        outstanding = (outstanding - principal_portion - prepayment).max(Decimal::ZERO);

        records.push(MonthlyRecord {
            month,
            emi: emi_paid,
            toward_principal: principal_portion,
            toward_interest: interest,
            outstanding_balance: outstanding,
            prepayment,
            paid_off: outstanding.is_zero(),
        });

        month += 1;
    }

    (records, total_interest)
}

fn summarise(
    params: &LoanParameters,
    baseline: Money,
    interest_paid: Money,
    payoff_months: u32,
) -> ScheduleSummary {
    ScheduleSummary {
        principal: params.principal,
        interest_without_prepayment: baseline,
        interest_with_prepayment: interest_paid,
        total_cost_without_prepayment: params.principal + baseline,
        total_cost_with_prepayment: params.principal + interest_paid,
        money_saved: baseline - interest_paid,
        payoff_years: payoff_months / MONTHS_PER_YEAR,
        payoff_months,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(params: &LoanParameters) -> LoanAmortResult<()> {
    if params.principal <= Decimal::ZERO {
        return Err(LoanAmortError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if params.tenure_years == 0 {
        return Err(LoanAmortError::InvalidInput {
            field: "tenure_years".into(),
            reason: "Tenure must be at least one year".into(),
        });
    }
    if params.annual_rate < Decimal::ZERO {
        return Err(LoanAmortError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Annual rate cannot be negative".into(),
        });
    }
    if params.extra_emi_per_year > 0 && MONTHS_PER_YEAR % params.extra_emi_per_year != 0 {
        return Err(LoanAmortError::InvalidInput {
            field: "extra_emi_per_year".into(),
            reason: "Extra EMIs per year must divide the year evenly (0, 1, 2, 3, 4, 6 or 12)"
                .into(),
        });
    }
    if params.emi_hike_rate < Decimal::ZERO {
        return Err(LoanAmortError::InvalidInput {
            field: "emi_hike_rate".into(),
            reason: "EMI hike rate cannot be negative".into(),
        });
    }
    Ok(())
}

fn collect_warnings(params: &LoanParameters) -> Vec<String> {
    let mut warnings = Vec::new();
    if params.annual_rate > dec!(0.5) {
        warnings.push(format!(
            "Annual rate {} is unusually high; results may be unreliable",
            params.annual_rate
        ));
    }
    if params.tenure_years > 50 {
        warnings.push(format!(
            "Tenure of {} years is unusually long",
            params.tenure_years
        ));
    }
    if params.emi_hike_rate > dec!(0.5) {
        warnings.push(format!(
            "EMI hike of {} per year is unusually aggressive",
            params.emi_hike_rate
        ));
    }
    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const TOL: Decimal = dec!(0.01);
    const CONSERVATION_TOL: Decimal = dec!(0.000001);

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    fn standard_loan() -> LoanParameters {
        LoanParameters {
            principal: dec!(5_000_000),
            annual_rate: dec!(0.08),
            tenure_years: 25,
            extra_emi_per_year: 0,
            emi_hike_rate: dec!(0),
        }
    }

    fn run(params: &LoanParameters) -> ScheduleOutput {
        generate_schedule(params).unwrap().result
    }

    // -----------------------------------------------------------------------
    // 1. Reference loan: EMI ~ 38,591, exactly 300 months, final balance 0
    // -----------------------------------------------------------------------
    #[test]
    fn test_reference_loan_full_tenure() {
        let out = run(&standard_loan());

        assert_close(out.standard_emi, dec!(38591), dec!(1.0), "standard EMI");
        assert_eq!(out.records.len(), 300);

        let last = out.records.last().unwrap();
        assert_eq!(last.outstanding_balance, Decimal::ZERO);
        assert!(last.paid_off);
        assert_eq!(out.summary.payoff_months, 300);
        assert_eq!(out.summary.payoff_years, 25);
    }

    // -----------------------------------------------------------------------
    // 2. Months are 1-based, sequential, no gaps
    // -----------------------------------------------------------------------
    #[test]
    fn test_months_sequential() {
        let out = run(&standard_loan());
        for (i, record) in out.records.iter().enumerate() {
            assert_eq!(record.month, i as u32 + 1);
        }
    }

    // -----------------------------------------------------------------------
    // 3. Balance monotonically non-increasing, never negative
    // -----------------------------------------------------------------------
    #[test]
    fn test_balance_monotonic_non_negative() {
        let mut params = standard_loan();
        params.extra_emi_per_year = 2;
        params.emi_hike_rate = dec!(0.05);
        let out = run(&params);

        let mut prev = params.principal;
        for record in &out.records {
            assert!(
                record.outstanding_balance <= prev,
                "month {}: balance {} rose above {}",
                record.month,
                record.outstanding_balance,
                prev
            );
            assert!(record.outstanding_balance >= Decimal::ZERO);
            prev = record.outstanding_balance;
        }
    }

    // -----------------------------------------------------------------------
    // 4. Principal conservation: portions + prepayments telescope to principal
    // -----------------------------------------------------------------------
    #[test]
    fn test_principal_conservation() {
        let mut params = standard_loan();
        params.extra_emi_per_year = 1;
        params.emi_hike_rate = dec!(0.05);
        let out = run(&params);

        let repaid: Decimal = out
            .records
            .iter()
            .map(|r| r.toward_principal + r.prepayment)
            .sum();
        assert_close(
            repaid,
            params.principal,
            CONSERVATION_TOL,
            "principal conservation",
        );
    }

    // -----------------------------------------------------------------------
    // 5. One extra EMI per year: strictly earlier payoff, positive savings
    // -----------------------------------------------------------------------
    #[test]
    fn test_single_extra_emi_saves_money() {
        let mut params = standard_loan();
        params.extra_emi_per_year = 1;
        let out = run(&params);

        assert!(out.summary.payoff_months < 300);
        assert!(out.summary.money_saved > Decimal::ZERO);
        assert!(out.records.last().unwrap().paid_off);
    }

    // -----------------------------------------------------------------------
    // 6. Prepayments fire exactly on the trigger months
    // -----------------------------------------------------------------------
    #[test]
    fn test_prepayment_trigger_months() {
        let mut params = standard_loan();
        params.extra_emi_per_year = 2;
        let out = run(&params);

        // Ignore the payoff month, where the prepayment may clamp to zero.
        let payoff = out.summary.payoff_months;
        for record in out.records.iter().filter(|r| r.month < payoff) {
            if record.month % 6 == 0 {
                assert!(
                    record.prepayment > Decimal::ZERO,
                    "month {} should carry a prepayment",
                    record.month
                );
            } else {
                assert_eq!(
                    record.prepayment,
                    Decimal::ZERO,
                    "month {} should not carry a prepayment",
                    record.month
                );
            }
        }
    }

    // -----------------------------------------------------------------------
    // 7. Monthly prepayments (12 per year) fire every month
    // -----------------------------------------------------------------------
    #[test]
    fn test_monthly_prepayments() {
        let mut params = standard_loan();
        params.extra_emi_per_year = 12;
        let out = run(&params);

        let payoff = out.summary.payoff_months;
        for record in out.records.iter().filter(|r| r.month < payoff) {
            assert!(record.prepayment > Decimal::ZERO);
        }
        // Roughly doubling the outflow should roughly halve the term.
        assert!(payoff < 160, "payoff took {} months", payoff);
    }

    // -----------------------------------------------------------------------
    // 8. Prepayment amount stays pegged to the initial EMI under hikes
    // -----------------------------------------------------------------------
    #[test]
    fn test_prepayment_fixed_at_initial_emi() {
        let mut params = standard_loan();
        params.extra_emi_per_year = 1;
        params.emi_hike_rate = dec!(0.10);
        let out = run(&params);

        // Month 24 sits in year 2: the installment is hiked, the prepayment
        // is not.
        let month_24 = &out.records[23];
        assert_eq!(month_24.prepayment, out.standard_emi);
        assert!(month_24.emi > out.standard_emi);
    }

    // -----------------------------------------------------------------------
    // 9. Hike timing: never in year 1, first at month 13, compounds annually
    // -----------------------------------------------------------------------
    #[test]
    fn test_hike_timing_and_compounding() {
        let mut params = standard_loan();
        params.emi_hike_rate = dec!(0.05);
        let out = run(&params);

        let base = out.standard_emi;
        for record in &out.records[..12] {
            assert_eq!(record.emi, base, "year 1 must not be hiked");
        }
        assert_eq!(out.records[12].emi, base * dec!(1.05));
        assert_eq!(out.records[23].emi, base * dec!(1.05));
        assert_close(
            out.records[24].emi,
            base * dec!(1.05) * dec!(1.05),
            TOL,
            "year 3 hike compounds",
        );
    }

    // -----------------------------------------------------------------------
    // 10. Running EMI never decreases before the payoff clamp
    // -----------------------------------------------------------------------
    #[test]
    fn test_emi_monotonic_under_hike() {
        let mut params = standard_loan();
        params.emi_hike_rate = dec!(0.05);
        let out = run(&params);

        let mut prev = Decimal::ZERO;
        for record in &out.records[..out.records.len() - 1] {
            assert!(
                record.emi >= prev,
                "month {}: EMI {} fell below {}",
                record.month,
                record.emi,
                prev
            );
            prev = record.emi;
        }
    }

    // -----------------------------------------------------------------------
    // 11. No hike: EMI constant apart from the payoff clamp
    // -----------------------------------------------------------------------
    #[test]
    fn test_emi_constant_without_hike() {
        let out = run(&standard_loan());
        let base = out.standard_emi;
        for record in &out.records[..out.records.len() - 1] {
            assert_eq!(record.emi, base);
        }
        assert!(out.records.last().unwrap().emi <= base);
    }

    // -----------------------------------------------------------------------
    // 12. Zero-rate loan: plain division, zero interest, zero savings
    // -----------------------------------------------------------------------
    #[test]
    fn test_zero_rate_loan() {
        let mut params = standard_loan();
        params.annual_rate = dec!(0);
        let out = run(&params);

        assert_eq!(out.standard_emi, params.principal / dec!(300));
        assert_eq!(out.summary.interest_with_prepayment, Decimal::ZERO);
        assert_eq!(out.summary.interest_without_prepayment, Decimal::ZERO);
        assert_eq!(out.summary.money_saved, Decimal::ZERO);
        for record in &out.records {
            assert_eq!(record.toward_interest, Decimal::ZERO);
        }
        assert_eq!(out.records.last().unwrap().outstanding_balance, Decimal::ZERO);
    }

    // -----------------------------------------------------------------------
    // 13. Paid flag is set exactly once, on the final record
    // -----------------------------------------------------------------------
    #[test]
    fn test_paid_flag_only_on_final_record() {
        let mut params = standard_loan();
        params.extra_emi_per_year = 2;
        let out = run(&params);

        let last_index = out.records.len() - 1;
        for (i, record) in out.records.iter().enumerate() {
            assert_eq!(record.paid_off, i == last_index, "month {}", record.month);
        }
    }

    // -----------------------------------------------------------------------
    // 14. Summary totals are internally consistent
    // -----------------------------------------------------------------------
    #[test]
    fn test_summary_consistency() {
        let mut params = standard_loan();
        params.extra_emi_per_year = 1;
        let out = run(&params);
        let s = &out.summary;

        assert_eq!(s.principal, params.principal);
        assert_eq!(
            s.total_cost_without_prepayment,
            s.principal + s.interest_without_prepayment
        );
        assert_eq!(
            s.total_cost_with_prepayment,
            s.principal + s.interest_with_prepayment
        );
        assert_eq!(
            s.money_saved,
            s.interest_without_prepayment - s.interest_with_prepayment
        );
        assert_eq!(s.payoff_years, s.payoff_months / 12);

        let accrued: Decimal = out.records.iter().map(|r| r.toward_interest).sum();
        assert_eq!(s.interest_with_prepayment, accrued);
    }

    // -----------------------------------------------------------------------
    // 15. Idempotence: identical inputs, identical result payloads
    // -----------------------------------------------------------------------
    #[test]
    fn test_idempotent_results() {
        let mut params = standard_loan();
        params.extra_emi_per_year = 4;
        params.emi_hike_rate = dec!(0.075);

        let first = serde_json::to_string(&run(&params)).unwrap();
        let second = serde_json::to_string(&run(&params)).unwrap();
        assert_eq!(first, second);
    }

    // -----------------------------------------------------------------------
    // 16. Validation: non-positive principal
    // -----------------------------------------------------------------------
    #[test]
    fn test_validation_principal() {
        let mut params = standard_loan();
        params.principal = dec!(0);
        assert!(generate_schedule(&params).is_err());
        params.principal = dec!(-100);
        assert!(generate_schedule(&params).is_err());
    }

    // -----------------------------------------------------------------------
    // 17. Validation: zero tenure
    // -----------------------------------------------------------------------
    #[test]
    fn test_validation_tenure() {
        let mut params = standard_loan();
        params.tenure_years = 0;
        assert!(generate_schedule(&params).is_err());
    }

    // -----------------------------------------------------------------------
    // 18. Validation: negative rate and negative hike
    // -----------------------------------------------------------------------
    #[test]
    fn test_validation_negative_rates() {
        let mut params = standard_loan();
        params.annual_rate = dec!(-0.01);
        assert!(generate_schedule(&params).is_err());

        let mut params = standard_loan();
        params.emi_hike_rate = dec!(-0.05);
        assert!(generate_schedule(&params).is_err());
    }

    // -----------------------------------------------------------------------
    // 19. Validation: extra EMI count must divide the year
    // -----------------------------------------------------------------------
    #[test]
    fn test_validation_extra_emi_divisibility() {
        for bad in [5u32, 7, 8, 9, 10, 11, 13, 24] {
            let mut params = standard_loan();
            params.extra_emi_per_year = bad;
            let result = generate_schedule(&params);
            assert!(
                matches!(result, Err(LoanAmortError::InvalidInput { .. })),
                "{} extra EMIs per year must be rejected",
                bad
            );
        }
        for good in [0u32, 1, 2, 3, 4, 6, 12] {
            let mut params = standard_loan();
            params.extra_emi_per_year = good;
            assert!(generate_schedule(&params).is_ok());
        }
    }

    // -----------------------------------------------------------------------
    // 20. Overflow on pathological inputs is an error, not garbage records
    // -----------------------------------------------------------------------
    #[test]
    fn test_pathological_inputs_rejected() {
        let mut params = standard_loan();
        params.annual_rate = dec!(5.0);
        params.tenure_years = 100;
        let result = generate_schedule(&params);
        assert!(matches!(
            result,
            Err(LoanAmortError::NumericOverflow { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // 21. Envelope: methodology and precision populated, warnings on oddities
    // -----------------------------------------------------------------------
    #[test]
    fn test_envelope_metadata_and_warnings() {
        let output = generate_schedule(&standard_loan()).unwrap();
        assert!(output.methodology.contains("Amortisation"));
        assert_eq!(output.metadata.precision, "rust_decimal_128bit");
        assert!(output.warnings.is_empty());

        let mut params = standard_loan();
        params.annual_rate = dec!(0.6);
        let output = generate_schedule(&params).unwrap();
        assert!(!output.warnings.is_empty());
    }

    // -----------------------------------------------------------------------
    // 22. More frequent prepayments shorten the term further
    // -----------------------------------------------------------------------
    #[test]
    fn test_prepayment_frequency_ordering() {
        let mut payoffs = Vec::new();
        for extra in [0u32, 1, 2, 4] {
            let mut params = standard_loan();
            params.extra_emi_per_year = extra;
            payoffs.push(run(&params).summary.payoff_months);
        }
        for pair in payoffs.windows(2) {
            assert!(
                pair[1] < pair[0],
                "more prepayments should pay off sooner: {:?}",
                payoffs
            );
        }
    }
}
