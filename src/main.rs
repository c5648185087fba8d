//! Dialogflow ES webhook fulfillment service.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │               FULFILLMENT WEBHOOK                 │
//!                        │                                                   │
//!   Dialogflow ES POST   │  ┌──────────┐    ┌────────────┐    ┌───────────┐ │
//!   ─────────────────────┼─▶│  http    │───▶│  dispatch  │───▶│  dialog   │ │
//!                        │  │  server  │    │ (log once) │    │  client   │ │
//!                        │  └──────────┘    └────────────┘    └─────┬─────┘ │
//!                        │                                          │       │
//!                        │                        ┌─────────────────┴────┐  │
//!                        │                        ▼                      ▼  │
//!                        │                 ┌────────────┐        ┌─────────┐│
//!                        │                 │  modules   │───────▶│connect- ││──▶ Redmine, Webex CC,
//!                        │                 │ (intents)  │        │  ors    ││    Webex Connect, JDS,
//!                        │                 └────────────┘        └─────────┘│    Google Calendar
//!                        │                                                   │
//!                        │  config (env + TOML) · observability · lifecycle  │
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use fulfillment_webhook::config::load_config;
use fulfillment_webhook::http::FulfillmentServer;
use fulfillment_webhook::lifecycle::{build_client, signals, Shutdown, StartupError};
use fulfillment_webhook::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "fulfillment-webhook")]
#[command(about = "Dialogflow ES webhook fulfillment service", long_about = None)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long, env = "FULFILLMENT_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding config and BIND_ADDRESS.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("fulfillment-webhook v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        company = %config.company.resolved_name(),
        debug = config.observability.debug,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let client = Arc::new(build_client(&config)?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for webhooks");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let server = FulfillmentServer::new(config, client);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
