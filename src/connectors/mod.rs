//! External-system connectors.
//!
//! # Data Flow
//! ```text
//! FulfillmentConfig (startup)
//!     → lifecycle::startup builds each connector, registers it on the builder
//!     → ConnectorRegistry (frozen inside the conversation client)
//!     → intent handlers / lookup callback borrow connectors per request
//! ```
//!
//! # Design Decisions
//! - Every connector is registered even when its settings are missing; the
//!   missing setting surfaces as `ConnectorError::NotConfigured` on use
//! - Each connector owns its `reqwest::Client` so TLS policy stays per system

pub mod google_calendar;
pub mod jds;
pub mod redmine;
pub mod types;
pub mod webex_cc;
pub mod webex_connect;

pub use google_calendar::GoogleCalendarConnector;
pub use jds::JdsConnector;
pub use redmine::{RedmineConnector, RedmineLookup};
pub use types::{Connector, ConnectorError, ConnectorRegistry, ConnectorResult};
pub use webex_cc::WebexCcConnector;
pub use webex_connect::WebexConnectConnector;
