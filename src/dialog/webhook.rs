//! Dialogflow ES v2 webhook wire types.
//!
//! Only the fields the fulfillment service reads or writes are modelled;
//! everything else is carried through `serde_json::Value` or ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dialog::context::ContextParams;

/// Inbound webhook request.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookRequest {
    pub response_id: String,
    /// Session path, `projects/<p>/agent/sessions/<id>`.
    pub session: String,
    pub query_result: QueryResult,
    pub original_detect_intent_request: OriginalDetectIntentRequest,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryResult {
    pub query_text: String,
    /// Action (skill) identifier configured on the matched intent.
    pub action: String,
    pub parameters: Map<String, Value>,
    pub all_required_params_present: bool,
    pub fulfillment_text: String,
    pub fulfillment_messages: Vec<Value>,
    pub output_contexts: Vec<Context>,
    pub intent: Option<IntentInfo>,
    pub language_code: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntentInfo {
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginalDetectIntentRequest {
    pub source: String,
    /// Custom payload set by the channel integration.
    pub payload: Map<String, Value>,
}

/// A dialog context as exchanged with the platform.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    /// Full context path, `<session>/contexts/<short-name>`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifespan_count: Option<u32>,
    #[serde(default)]
    pub parameters: ContextParams,
}

impl Context {
    /// The trailing segment of the context path.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Outbound webhook response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fulfillment_text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fulfillment_messages: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_contexts: Vec<Context>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followup_event_input: Option<EventInput>,
}

/// Follow-up event that makes the platform trigger another intent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub name: String,
    pub language_code: String,
    #[serde(default)]
    pub parameters: ContextParams,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_platform_request() {
        let body = json!({
            "responseId": "r-1",
            "session": "projects/demo/agent/sessions/abc",
            "queryResult": {
                "queryText": "talk to a loan officer",
                "action": "skill.speaktoloanofficer",
                "parameters": {},
                "allRequiredParamsPresent": true,
                "fulfillmentText": "Connecting you now.",
                "outputContexts": [{
                    "name": "projects/demo/agent/sessions/abc/contexts/session-vars",
                    "lifespanCount": 49,
                    "parameters": { "customerName": "Pat" }
                }],
                "intent": { "name": "projects/demo/agent/intents/1", "displayName": "loan" },
                "languageCode": "en"
            },
            "originalDetectIntentRequest": {
                "source": "DIALOGFLOW_CONSOLE",
                "payload": { "customerIdentified": "true" }
            }
        });

        let req: WebhookRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.query_result.action, "skill.speaktoloanofficer");
        assert_eq!(req.query_result.output_contexts[0].short_name(), "session-vars");
        assert_eq!(
            req.query_result.output_contexts[0].parameters.get("customerName"),
            Some("Pat")
        );
        assert_eq!(
            req.original_detect_intent_request.payload["customerIdentified"],
            "true"
        );
    }

    #[test]
    fn test_response_omits_empty_fields() {
        let resp = WebhookResponse {
            fulfillment_text: "hi".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value, json!({ "fulfillmentText": "hi" }));
    }
}
