//! Conversation client: turns one webhook request into one response.
//!
//! # Request Flow
//! ```text
//! body bytes
//!     → WebhookRequest (serde)
//!     → session params: `session-vars` context, or on a new session
//!       base params → populate_from_payload → populate_from_lookup
//!     → intent handler for queryResult.action (default: echo platform text)
//!     → WebhookResponse + refreshed `session-vars` context
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};

use crate::connectors::{Connector, ConnectorRegistry, ConnectorResult};
use crate::dialog::context::{session_params, ContextParams, DialogContext};
use crate::dialog::error::FulfillmentError;
use crate::dialog::intent::{Intent, IntentRegistry};
use crate::dialog::payload::PayloadPopulator;
use crate::dialog::webhook::{WebhookRequest, WebhookResponse};
use crate::http::dispatch::RequestHandler;
use crate::observability::metrics;

/// Async callback that enriches a new session from an external lookup.
#[async_trait]
pub trait LookupPopulator: Send + Sync {
    async fn populate(&self, ctx: &mut DialogContext, connectors: &ConnectorRegistry);
}

/// Startup-time assembly of a [`ConversationClient`].
pub struct ConversationClientBuilder {
    base_params: ContextParams,
    populate_from_payload: Option<Box<PayloadPopulator>>,
    populate_from_lookup: Option<Arc<dyn LookupPopulator>>,
    connectors: ConnectorRegistry,
    intents: IntentRegistry,
}

impl ConversationClientBuilder {
    pub fn new(base_params: ContextParams) -> Self {
        Self {
            base_params,
            populate_from_payload: None,
            populate_from_lookup: None,
            connectors: ConnectorRegistry::new(),
            intents: IntentRegistry::new(),
        }
    }

    pub fn populate_from_payload(mut self, populator: Box<PayloadPopulator>) -> Self {
        self.populate_from_payload = Some(populator);
        self
    }

    pub fn populate_from_lookup<L: LookupPopulator + 'static>(mut self, lookup: L) -> Self {
        self.populate_from_lookup = Some(Arc::new(lookup));
        self
    }

    pub fn register_connector<C: Connector>(&mut self, connector: C) -> ConnectorResult<()> {
        self.connectors.register(connector)
    }

    pub fn register_intent(&mut self, intent: Intent) -> Result<(), FulfillmentError> {
        self.intents.register(intent)
    }

    pub fn build(self) -> ConversationClient {
        tracing::info!(
            connectors = self.connectors.len(),
            intents = self.intents.len(),
            "Conversation client ready"
        );
        ConversationClient {
            base_params: self.base_params,
            populate_from_payload: self.populate_from_payload,
            populate_from_lookup: self.populate_from_lookup,
            connectors: self.connectors,
            intents: self.intents,
        }
    }
}

/// Fulfills webhook requests against the registered intents and connectors.
///
/// Immutable once built; share it behind an `Arc`.
pub struct ConversationClient {
    base_params: ContextParams,
    populate_from_payload: Option<Box<PayloadPopulator>>,
    populate_from_lookup: Option<Arc<dyn LookupPopulator>>,
    connectors: ConnectorRegistry,
    intents: IntentRegistry,
}

impl ConversationClient {
    pub fn connectors(&self) -> &ConnectorRegistry {
        &self.connectors
    }

    pub fn intents(&self) -> &IntentRegistry {
        &self.intents
    }

    /// Session parameters for a request that carries none yet.
    fn new_session_params(&self, request: &WebhookRequest) -> ContextParams {
        let params = self.base_params.clone();
        match &self.populate_from_payload {
            Some(populate) => populate(params, &request.original_detect_intent_request.payload),
            None => params,
        }
    }

    /// Fulfill a parsed request.
    pub async fn process(&self, request: WebhookRequest) -> Result<WebhookResponse, FulfillmentError> {
        let (params, new_session) = match session_params(&request) {
            Some(carried) => {
                let mut params = self.base_params.clone();
                params.merge(carried);
                (params, false)
            }
            None => (self.new_session_params(&request), true),
        };

        let mut ctx = DialogContext::new(request, params);
        if new_session {
            if let Some(lookup) = &self.populate_from_lookup {
                lookup.populate(&mut ctx, &self.connectors).await;
            }
        }

        let action = ctx.action().to_string();
        let wait_for_reply = match self.intents.get(&action) {
            Some(intent) => {
                metrics::record_intent(&action, true);
                tracing::debug!(action = %action, "Dispatching intent");
                intent
                    .handler
                    .handle(&mut ctx, &self.connectors)
                    .await
                    .map_err(|source| FulfillmentError::Connector {
                        action: action.clone(),
                        source,
                    })?;
                intent.wait_for_reply
            }
            None => {
                metrics::record_intent(&action, false);
                tracing::debug!(action = %action, "No intent registered, echoing platform text");
                ctx.append_fulfillment_text();
                true
            }
        };

        ctx.set_param("waitForReply", if wait_for_reply { "1" } else { "0" });
        if !action.is_empty() {
            ctx.set_param("lastAction", action);
        }
        Ok(ctx.into_response())
    }

    /// Parse and fulfill a raw webhook body.
    pub async fn handle_body(&self, body: &[u8]) -> Result<WebhookResponse, FulfillmentError> {
        let request: WebhookRequest = serde_json::from_slice(body)
            .map_err(|e| FulfillmentError::InvalidRequest(e.to_string()))?;
        self.process(request).await
    }
}

#[async_trait]
impl RequestHandler for ConversationClient {
    async fn handle_request(&self, _headers: HeaderMap, body: Bytes) -> Result<Response, FulfillmentError> {
        let response = self.handle_body(&body).await?;
        Ok(Json(response).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::{ConnectorError, ConnectorResult};
    use crate::dialog::intent::IntentHandler;
    use crate::dialog::payload::{base_params, payload_populator};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLookup(Arc<AtomicUsize>);

    #[async_trait]
    impl LookupPopulator for CountingLookup {
        async fn populate(&self, ctx: &mut DialogContext, _: &ConnectorRegistry) {
            self.0.fetch_add(1, Ordering::SeqCst);
            ctx.set_param("customerName", "Looked Up");
        }
    }

    struct Failing;

    #[async_trait]
    impl IntentHandler for Failing {
        async fn handle(&self, _: &mut DialogContext, _: &ConnectorRegistry) -> ConnectorResult<()> {
            Err(ConnectorError::NotRegistered("redmine"))
        }
    }

    fn client(lookups: Arc<AtomicUsize>) -> ConversationClient {
        let mut builder = ConversationClientBuilder::new(base_params())
            .populate_from_payload(payload_populator("Cisco"))
            .populate_from_lookup(CountingLookup(lookups));
        builder
            .register_intent(Intent::from_fn("skill.hello", true, |ctx| {
                ctx.append_fulfillment_text()
            }))
            .unwrap();
        builder
            .register_intent(Intent::new("skill.broken", true, Failing))
            .unwrap();
        builder.build()
    }

    fn request(action: &str, contexts: serde_json::Value) -> WebhookRequest {
        serde_json::from_value(json!({
            "session": "projects/p/agent/sessions/s",
            "queryResult": {
                "action": action,
                "fulfillmentText": "Hi there.",
                "outputContexts": contexts
            },
            "originalDetectIntentRequest": { "payload": { "customerValidated": "true" } }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_new_session_populates_params() {
        let lookups = Arc::new(AtomicUsize::new(0));
        let resp = client(lookups.clone())
            .process(request("skill.hello", json!([])))
            .await
            .unwrap();

        assert_eq!(resp.fulfillment_text, "Hi there.");
        let params = &resp.output_contexts[0].parameters;
        assert_eq!(params.get("customerValidated"), Some("1"));
        assert_eq!(params.get("customerIdentified"), Some("0"));
        assert_eq!(params.get("companyName"), Some("Cisco"));
        assert_eq!(params.get("customerName"), Some("Looked Up"));
        assert_eq!(params.get("lastAction"), Some("skill.hello"));
        assert_eq!(lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_existing_session_skips_population() {
        let lookups = Arc::new(AtomicUsize::new(0));
        let contexts = json!([{
            "name": "projects/p/agent/sessions/s/contexts/session-vars",
            "parameters": { "companyName": "Acme", "customerValidated": "0" }
        }]);
        let resp = client(lookups.clone())
            .process(request("skill.hello", contexts))
            .await
            .unwrap();

        let params = &resp.output_contexts[0].parameters;
        assert_eq!(params.get("companyName"), Some("Acme"));
        assert_eq!(params.get("customerValidated"), Some("0"));
        assert_eq!(lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_action_echoes_platform_text() {
        let resp = client(Arc::new(AtomicUsize::new(0)))
            .process(request("skill.unknown", json!([])))
            .await
            .unwrap();
        assert_eq!(resp.fulfillment_text, "Hi there.");
        assert!(resp.followup_event_input.is_none());
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let err = client(Arc::new(AtomicUsize::new(0)))
            .process(request("skill.broken", json!([])))
            .await
            .unwrap_err();
        assert!(matches!(err, FulfillmentError::Connector { ref action, .. } if action == "skill.broken"));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let err = client(Arc::new(AtomicUsize::new(0)))
            .handle_body(b"{not json")
            .await
            .unwrap_err();
        assert!(matches!(err, FulfillmentError::InvalidRequest(_)));
    }
}
