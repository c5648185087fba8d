//! Session parameters derived from the channel payload.

use serde_json::{Map, Value};

use crate::dialog::context::ContextParams;

/// Callback that fills session parameters from the payload on a new session.
pub type PayloadPopulator = dyn Fn(ContextParams, &Map<String, Value>) -> ContextParams + Send + Sync;

/// Default session parameters; every key starts empty.
pub fn base_params() -> ContextParams {
    [
        "customerName",
        "companyName",
        "customerIdentified",
        "customerIdentifiedBy",
        "customerValidated",
    ]
    .into_iter()
    .map(|key| (key, ""))
    .collect()
}

/// `"1"` when the payload field is exactly the string `"true"`, else `"0"`.
pub fn flag_code(payload: &Map<String, Value>, key: &str) -> &'static str {
    match payload.get(key) {
        Some(Value::String(s)) if s == "true" => "1",
        _ => "0",
    }
}

/// Normalize identification flags and resolve the company name.
pub fn populate_from_payload(
    mut params: ContextParams,
    payload: &Map<String, Value>,
    default_company: &str,
) -> ContextParams {
    params.set("customerIdentified", flag_code(payload, "customerIdentified"));
    params.set("customerValidated", flag_code(payload, "customerValidated"));

    let company = company_name(payload).unwrap_or_else(|| default_company.to_string());
    params.set("companyName", company);
    params
}

/// A set `companyName` payload value rendered as text. Empty strings, zero,
/// `false`, null and structured values count as unset.
fn company_name(payload: &Map<String, Value>) -> Option<String> {
    match payload.get("companyName")? {
        Value::String(name) if !name.is_empty() => Some(name.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Box `populate_from_payload` with a fixed company default.
pub fn payload_populator(default_company: impl Into<String>) -> Box<PayloadPopulator> {
    let default_company = default_company.into();
    Box::new(move |params: ContextParams, payload: &Map<String, Value>| {
        populate_from_payload(params, payload, &default_company)
    })
}
