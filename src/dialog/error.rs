//! Fulfillment error types for HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::connectors::ConnectorError;

/// Errors raised while fulfilling a webhook request.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// The body is not a webhook request.
    #[error("invalid webhook request: {0}")]
    InvalidRequest(String),

    /// An intent handler's connector call failed.
    #[error("intent '{action}' failed: {source}")]
    Connector {
        action: String,
        #[source]
        source: ConnectorError,
    },

    /// Two intents claimed the same action at startup.
    #[error("intent '{0}' registered twice")]
    DuplicateIntent(String),
}

/// JSON body for fulfillment errors.
#[derive(Serialize)]
pub struct FulfillmentErrorResponse {
    /// Error code identifier.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

impl FulfillmentError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Connector { .. } => StatusCode::BAD_GATEWAY,
            Self::DuplicateIntent(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::Connector { .. } => "connector_failed",
            Self::DuplicateIntent(_) => "internal_error",
        }
    }
}

impl IntoResponse for FulfillmentError {
    fn into_response(self) -> Response {
        let body = FulfillmentErrorResponse {
            error: self.code(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = FulfillmentError::InvalidRequest("eof".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = FulfillmentError::Connector {
            action: "skill.sendotp.sms".into(),
            source: ConnectorError::NotRegistered("webex_connect"),
        };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("skill.sendotp.sms"));
    }
}
