//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher, conversation client, connectors produce:
//!     → logging.rs (structured log events, tagged request dump)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout log lines
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request via the trace span
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
