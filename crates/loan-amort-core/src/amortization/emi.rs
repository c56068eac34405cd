//! Installment and interest-accrual calculators.
//!
//! The component pieces of the amortisation engine: the annuity-formula
//! installment, per-month interest accrual, and the no-prepayment baseline
//! the savings comparison is measured against. All math in
//! `rust_decimal::Decimal`.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LoanAmortError;
use crate::types::{Money, Rate};
use crate::LoanAmortResult;

/// Months in a repayment year.
pub const MONTHS_PER_YEAR: u32 = 12;

const TWELVE: Decimal = dec!(12);

/// Fixed monthly installment that amortises `principal` to zero over
/// `tenure_years` at `annual_rate`.
///
/// EMI = P * i * (1+i)^n / ((1+i)^n - 1), with i the monthly rate and n the
/// total number of months. A zero rate degenerates the annuity formula and
/// the installment is a plain division.
pub fn standard_emi(
    principal: Money,
    annual_rate: Rate,
    tenure_years: u32,
) -> LoanAmortResult<Money> {
    if tenure_years == 0 {
        return Err(LoanAmortError::InvalidInput {
            field: "tenure_years".into(),
            reason: "Tenure must be at least one year".into(),
        });
    }

    let total_months = tenure_years * MONTHS_PER_YEAR;
    if annual_rate.is_zero() {
        return Ok(principal / Decimal::from(total_months));
    }

    let monthly_rate = annual_rate / TWELVE;
    let factor = (Decimal::ONE + monthly_rate)
        .checked_powu(u64::from(total_months))
        .ok_or_else(|| LoanAmortError::NumericOverflow {
            context: "EMI compounding factor".into(),
        })?;

    let denom = factor - Decimal::ONE;
    if denom.is_zero() {
        return Err(LoanAmortError::DivisionByZero {
            context: "EMI annuity denominator".into(),
        });
    }

    let numerator = principal
        .checked_mul(monthly_rate)
        .and_then(|v| v.checked_mul(factor))
        .ok_or_else(|| LoanAmortError::NumericOverflow {
            context: "EMI numerator".into(),
        })?;

    Ok(numerator / denom)
}

/// Interest accrued for one month against the current outstanding balance.
pub fn monthly_interest(outstanding: Money, annual_rate: Rate) -> Money {
    outstanding * annual_rate / TWELVE
}

/// Total interest over the full declared tenure with no hikes and no
/// prepayments, accrued month by month at the constant standard EMI.
///
/// Mirrors the prepayment simulator's accrual loop so both scenarios are
/// measured under identical semantics. Agrees with the closed form
/// EMI · n − principal when the loop runs to completion.
pub fn baseline_interest(
    principal: Money,
    annual_rate: Rate,
    tenure_years: u32,
) -> LoanAmortResult<Money> {
    if annual_rate.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let emi = standard_emi(principal, annual_rate, tenure_years)?;
    let total_months = tenure_years * MONTHS_PER_YEAR;

    let mut balance = principal;
    let mut total_interest = Decimal::ZERO;

    for _ in 0..total_months {
        if balance <= Decimal::ZERO {
            break;
        }
        let interest = monthly_interest(balance, annual_rate);
        let mut principal_portion = emi - interest;
        if principal_portion > balance {
            principal_portion = balance;
        }
        total_interest += interest;
        balance -= principal_portion;
    }

    Ok(total_interest)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
