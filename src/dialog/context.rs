//! Per-request dialog state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dialog::webhook::{Context, EventInput, WebhookRequest, WebhookResponse};

/// Short name of the context carrying session parameters between turns.
pub const SESSION_VARS: &str = "session-vars";

/// Lifespan given to the session context on every response.
pub const SESSION_VARS_LIFESPAN: u32 = 50;

/// Parameter holding the text of the last response.
pub const LAST_FULFILLMENT_TEXT: &str = "lastFulfillmentText";

/// String-valued context parameters.
///
/// The platform may send numbers, booleans or structured values; they are
/// kept as their JSON text. Nulls are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct ContextParams(BTreeMap<String, String>);

impl From<Map<String, Value>> for ContextParams {
    fn from(map: Map<String, Value>) -> Self {
        let inner = map
            .into_iter()
            .filter_map(|(k, v)| match v {
                Value::Null => None,
                Value::String(s) => Some((k, s)),
                other => Some((k, other.to_string())),
            })
            .collect();
        Self(inner)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ContextParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl ContextParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Copy every entry of `other` over this map.
    pub fn merge(&mut self, other: &ContextParams) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Working state for one webhook request.
///
/// Intent handlers read the request and session parameters through it and
/// shape the response.
#[derive(Debug)]
pub struct DialogContext {
    request: WebhookRequest,
    /// Session parameters, persisted in the `session-vars` context.
    pub params: ContextParams,
    response: WebhookResponse,
}

impl DialogContext {
    pub fn new(request: WebhookRequest, params: ContextParams) -> Self {
        Self {
            request,
            params,
            response: WebhookResponse::default(),
        }
    }

    pub fn request(&self) -> &WebhookRequest {
        &self.request
    }

    /// The channel's custom payload.
    pub fn payload(&self) -> &Map<String, Value> {
        &self.request.original_detect_intent_request.payload
    }

    /// A payload field rendered as a string, if present and scalar.
    pub fn payload_str(&self, key: &str) -> Option<String> {
        match self.payload().get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn action(&self) -> &str {
        &self.request.query_result.action
    }

    /// A query parameter extracted by the platform for this turn.
    pub fn query_param(&self, key: &str) -> Option<String> {
        match self.request.query_result.parameters.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.set(key, value);
    }

    /// Text the platform composed for the matched intent.
    pub fn platform_fulfillment_text(&self) -> &str {
        &self.request.query_result.fulfillment_text
    }

    pub fn fulfillment_text(&self) -> &str {
        &self.response.fulfillment_text
    }

    /// Append the platform's fulfillment text to the outgoing text.
    pub fn append_fulfillment_text(&mut self) {
        let text = self.request.query_result.fulfillment_text.clone();
        self.append_text(&text);
    }

    /// Append arbitrary text to the outgoing text.
    pub fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let out = &mut self.response.fulfillment_text;
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(text);
        let last = out.clone();
        self.params.set(LAST_FULFILLMENT_TEXT, last);
    }

    /// Replace the outgoing text with the platform's fulfillment text.
    pub fn set_fulfillment_text(&mut self) {
        let text = self.request.query_result.fulfillment_text.clone();
        self.set_text(text);
    }

    /// Replace the outgoing text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.params.set(LAST_FULFILLMENT_TEXT, text.clone());
        self.response.fulfillment_text = text;
    }

    /// Answer with a follow-up event instead of waiting for user input.
    ///
    /// The event carries the session parameters plus `fulfillmentText`.
    pub fn respond_with_event(&mut self, name: &str, text: Option<&str>) {
        let mut parameters = self.params.clone();
        if let Some(text) = text {
            parameters.set("fulfillmentText", text);
        }
        let language_code = match self.request.query_result.language_code.as_str() {
            "" => "en".to_string(),
            code => code.to_string(),
        };
        self.response.followup_event_input = Some(EventInput {
            name: name.to_string(),
            language_code,
            parameters,
        });
    }

    pub fn followup_event(&self) -> Option<&EventInput> {
        self.response.followup_event_input.as_ref()
    }

    /// Finish the turn: attach the refreshed session context and return the
    /// response.
    pub fn into_response(self) -> WebhookResponse {
        let mut response = self.response;
        response.output_contexts.push(Context {
            name: format!("{}/contexts/{}", self.request.session, SESSION_VARS),
            lifespan_count: Some(SESSION_VARS_LIFESPAN),
            parameters: self.params,
        });
        response
    }
}

/// Find the session parameters carried by the request, if any.
pub fn session_params(request: &WebhookRequest) -> Option<&ContextParams> {
    request
        .query_result
        .output_contexts
        .iter()
        .find(|c| c.short_name() == SESSION_VARS)
        .map(|c| &c.parameters)
}
