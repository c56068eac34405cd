use napi::Result as NapiResult;
use napi_derive::napi;

use loan_amort_core::amortization::emi;
use loan_amort_core::amortization::schedule::{self, LoanParameters};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortisation
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let params: LoanParameters = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::generate_schedule(&params).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn standard_emi(input_json: String) -> NapiResult<String> {
    let params: LoanParameters = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let emi =
        emi::standard_emi(params.principal, params.annual_rate, params.tenure_years)
            .map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({ "standard_emi": emi })).map_err(to_napi_error)
}

#[napi]
pub fn baseline_interest(input_json: String) -> NapiResult<String> {
    let params: LoanParameters = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let interest =
        emi::baseline_interest(params.principal, params.annual_rate, params.tenure_years)
            .map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({ "baseline_interest": interest }))
        .map_err(to_napi_error)
}
