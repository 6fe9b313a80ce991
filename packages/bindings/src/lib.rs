use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Retirement projection
// ---------------------------------------------------------------------------

/// Project every enabled account to retirement age. Takes a JSON
/// `SimulationRequest`, returns the JSON response envelope.
#[napi]
pub fn simulate_retirement(input_json: String) -> NapiResult<String> {
    let request: finplan_core::retirement::simulation::SimulationRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::retirement::simulation::run_simulation(&request)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Mortgage comparison
// ---------------------------------------------------------------------------

/// Compare accelerated mortgage repayment against investing the difference.
/// Takes a JSON `MortgageComparisonRequest`, returns the JSON response
/// envelope.
#[napi]
pub fn compare_mortgage(input_json: String) -> NapiResult<String> {
    let request: finplan_core::mortgage::comparison::MortgageComparisonRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::mortgage::comparison::compare_mortgage_vs_invest(&request)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
