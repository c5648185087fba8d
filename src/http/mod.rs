//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (assign / propagate request ID)
//!     → dispatch.rs (request dump, delegate to the conversation client)
//!     → response written by the conversation client
//! ```

pub mod dispatch;
pub mod request;
pub mod server;

pub use dispatch::{handle_fulfillment, DispatchState, RequestHandler};
pub use request::X_REQUEST_ID;
pub use server::FulfillmentServer;
