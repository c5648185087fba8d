//! Webhook fulfillment dispatcher.
//!
//! Dumps the inbound request once, then hands it to the injected
//! [`RequestHandler`] and returns whatever that produces, errors included.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::Response,
};

use crate::dialog::FulfillmentError;
use crate::observability::logging::{fmt_log, headers_to_json};
use crate::observability::metrics;

/// Tag prefixed to the request dump.
pub const LOG_TAG: &str = "handleRequest";

/// The collaborator that actually fulfills a webhook request.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle_request(
        &self,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, FulfillmentError>;
}

/// State shared by every dispatcher invocation.
#[derive(Clone)]
pub struct DispatchState {
    pub handler: Arc<dyn RequestHandler>,
    pub redacted_headers: Arc<[String]>,
}

impl DispatchState {
    pub fn new(handler: Arc<dyn RequestHandler>, redacted_headers: Vec<String>) -> Self {
        Self {
            handler,
            redacted_headers: redacted_headers.into(),
        }
    }
}

/// Write the single diagnostic line for a request.
pub fn log_request(headers: &HeaderMap, body: &[u8], redacted: &[String]) {
    tracing::info!(
        headers = %headers_to_json(headers, redacted),
        body = %String::from_utf8_lossy(body),
        "{}",
        fmt_log(LOG_TAG, "Dialogflow request")
    );
}

/// Entry point for the fulfillment webhook.
pub async fn handle_fulfillment(
    State(state): State<DispatchState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, FulfillmentError> {
    let start = Instant::now();
    log_request(&headers, &body, &state.redacted_headers);

    let result = state.handler.handle_request(headers, body).await;

    let status = match &result {
        Ok(response) => response.status(),
        Err(e) => e.status(),
    };
    metrics::record_request(status.as_u16(), start);
    result
}

