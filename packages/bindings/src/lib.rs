use napi::Result as NapiResult;
use napi_derive::napi;

use bond_pricer_core::fixed_income::terms::PricingRequest;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_request(input_json: &str) -> NapiResult<PricingRequest> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[napi]
pub fn build_coupon_schedule(input_json: String) -> NapiResult<String> {
    let request = parse_request(&input_json)?;
    let output = bond_pricer_core::fixed_income::schedule::generate_schedule(&request)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

#[napi]
pub fn price_bond_trade(input_json: String) -> NapiResult<String> {
    let request = parse_request(&input_json)?;
    let output =
        bond_pricer_core::fixed_income::pricing::price_trade(&request).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[napi]
pub fn build_pricing_report(input_json: String) -> NapiResult<String> {
    let request = parse_request(&input_json)?;
    let output = bond_pricer_core::report::generate_report(&request).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
