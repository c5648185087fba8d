//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the fulfillment and health handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Bind server to listener and stop on the shutdown signal

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::FulfillmentConfig;
use crate::http::dispatch::{handle_fulfillment, DispatchState, RequestHandler};
use crate::http::request::{propagate_request_id_layer, request_id_of, set_request_id_layer};

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// HTTP server for the fulfillment webhook.
pub struct FulfillmentServer {
    router: Router,
    config: FulfillmentConfig,
}

impl FulfillmentServer {
    /// Create a server that forwards webhooks to `handler`.
    pub fn new(config: FulfillmentConfig, handler: Arc<dyn RequestHandler>) -> Self {
        let state = DispatchState::new(handler, config.security.redacted_headers.clone());
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &FulfillmentConfig, state: DispatchState) -> Router {
        let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "webhook",
                request_id = %request_id_of(request),
                method = %request.method(),
                path = %request.uri().path(),
            )
        });

        Router::new()
            .route("/", post(handle_fulfillment))
            .route("/fulfillment", post(handle_fulfillment))
            .route("/health", get(health))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(trace)
                    .layer(propagate_request_id_layer())
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// The configured router, for serving elsewhere or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &FulfillmentConfig {
        &self.config
    }
}
