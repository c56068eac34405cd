//! Loan amortisation: installment calculators and the prepayment simulator.

pub mod emi;
pub mod schedule;
