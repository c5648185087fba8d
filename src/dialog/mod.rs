//! Dialogflow ES conversation handling.
//!
//! # Data Flow
//! ```text
//! webhook.rs (wire types)
//!     → client.rs (session params, intent dispatch)
//!     → context.rs (per-request DialogContext handlers mutate)
//!     → intent.rs (action → handler registry)
//!     → payload.rs (new-session normalization of the channel payload)
//! ```

pub mod client;
pub mod context;
pub mod error;
pub mod intent;
pub mod payload;
pub mod webhook;

pub use client::{ConversationClient, ConversationClientBuilder, LookupPopulator};
pub use context::{ContextParams, DialogContext};
pub use error::FulfillmentError;
pub use intent::{FnHandler, Intent, IntentHandler, IntentRegistry};
pub use webhook::{WebhookRequest, WebhookResponse};
