//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level from config, `DEBUG` and `RUST_LOG`
//! - Render the tagged request dump written once per webhook
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over config when present

use std::collections::BTreeMap;

use axum::http::HeaderMap;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Placeholder written in place of masked header values.
pub const REDACTED: &str = "[redacted]";

/// Default filter directive derived from the observability config.
pub fn default_directive(config: &ObservabilityConfig) -> String {
    let level = if config.debug {
        "debug"
    } else {
        config.log_level.as_str()
    };
    format!("fulfillment_webhook={level},tower_http={level}")
}

/// Install the global tracing subscriber.
pub fn init_logging(config: &ObservabilityConfig) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(config).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Prefix a message with a bracketed operation tag.
pub fn fmt_log(tag: &str, message: &str) -> String {
    format!("[{tag}] {message}")
}

/// Serialize request headers as a JSON object, masking `redacted` names.
///
/// Repeated headers are joined with ", ". Non-UTF-8 values are written
/// lossily.
pub fn headers_to_json(headers: &HeaderMap, redacted: &[String]) -> String {
    let mut map: BTreeMap<&str, String> = BTreeMap::new();
    for (name, value) in headers {
        let name = name.as_str();
        let value = if redacted.iter().any(|r| r.eq_ignore_ascii_case(name)) {
            REDACTED.to_string()
        } else {
            String::from_utf8_lossy(value.as_bytes()).into_owned()
        };
        map.entry(name)
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    serde_json::to_string(&map).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_fmt_log() {
        assert_eq!(fmt_log("handleRequest", "hello"), "[handleRequest] hello");
    }

    #[test]
    fn test_debug_overrides_level() {
        let mut config = ObservabilityConfig::default();
        assert_eq!(
            default_directive(&config),
            "fulfillment_webhook=info,tower_http=info"
        );
        config.debug = true;
        assert!(default_directive(&config).starts_with("fulfillment_webhook=debug"));
    }

    #[test]
    fn test_headers_masked_and_joined() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer secret"));
        headers.append("accept", HeaderValue::from_static("text/plain"));
        headers.append("accept", HeaderValue::from_static("application/json"));

        let json = headers_to_json(&headers, &["Authorization".to_string()]);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["authorization"], REDACTED);
        assert_eq!(parsed["accept"], "text/plain, application/json");
        assert!(!json.contains("secret"));
    }
}
