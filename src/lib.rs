//! Dialogflow ES Webhook Fulfillment Library

pub mod config;
pub mod connectors;
pub mod dialog;
pub mod http;
pub mod lifecycle;
pub mod modules;
pub mod observability;

pub use config::schema::FulfillmentConfig;
pub use dialog::ConversationClient;
pub use http::FulfillmentServer;
pub use lifecycle::Shutdown;
