//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, overlay environment)
//!     → validation.rs (semantic checks)
//!     → FulfillmentConfig (validated, immutable)
//!     → shared via Arc with the conversation client and connectors
//! ```
//!
//! # Design Decisions
//! - Config is built once at startup and never mutated afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CompanyConfig, FulfillmentConfig, GoogleCalendarConfig, JdsConfig, ListenerConfig,
    ObservabilityConfig, RedmineConfig, SecurityConfig, TimeoutConfig, WebexConnectConfig,
};
