pub mod amortization;
pub mod error;
pub mod types;

pub use error::LoanAmortError;
pub use types::*;

/// Standard result type for all loan-amort operations
pub type LoanAmortResult<T> = Result<T, LoanAmortError>;
