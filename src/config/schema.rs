//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! fulfillment service. All types derive Serde traits for deserialization
//! from config files; connector credentials usually arrive through the
//! environment instead (see `loader.rs`).

use serde::{Deserialize, Serialize};

/// Company name used when neither the payload nor the environment names one.
pub const FALLBACK_COMPANY_NAME: &str = "Cisco";

/// Root configuration for the fulfillment service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FulfillmentConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request hardening.
    pub security: SecurityConfig,

    /// Company profile defaults.
    pub company: CompanyConfig,

    /// Redmine ticketing connector.
    pub redmine: RedmineConfig,

    /// Webex Connect SMS/email flows.
    pub webex_connect: WebexConnectConfig,

    /// Webex Contact Center Journey Data Services.
    pub jds: JdsConfig,

    /// Google Calendar connector.
    pub google_calendar: GoogleCalendarConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for inbound requests and outbound connector calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Inbound request timeout in seconds.
    pub request_secs: u64,

    /// Outbound connector call timeout in seconds.
    pub connector_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            connector_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Raise the crate's log level to debug regardless of `log_level`.
    pub debug: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum webhook body size in bytes.
    pub max_body_size: usize,

    /// Header names whose values are masked in the request dump.
    pub redacted_headers: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
            redacted_headers: vec![
                "authorization".to_string(),
                "proxy-authorization".to_string(),
                "cookie".to_string(),
                "x-api-key".to_string(),
            ],
        }
    }
}

/// Company profile defaults.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CompanyConfig {
    /// Display name used when the payload carries no `companyName`.
    pub default_name: Option<String>,
}

impl CompanyConfig {
    /// Resolve the default company name, falling back to the built-in one.
    pub fn resolved_name(&self) -> &str {
        self.default_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_COMPANY_NAME)
    }
}

/// Redmine ticketing API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedmineConfig {
    /// Redmine host name, with or without scheme.
    pub hostname: Option<String>,

    /// REST API key sent as `X-Redmine-API-Key`.
    pub api_key: Option<String>,

    /// Verify the Redmine TLS certificate.
    pub reject_unauthorized: bool,

    /// Project issues are filed under.
    pub project_id: String,
}

impl Default for RedmineConfig {
    fn default() -> Self {
        Self {
            hostname: None,
            api_key: None,
            reject_unauthorized: true,
            project_id: "support".to_string(),
        }
    }
}

/// Webex Connect flow endpoints.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WebexConnectConfig {
    pub sms_send_otp_url: Option<String>,
    pub sms_pw_reset_url: Option<String>,
    pub email_send_otp_url: Option<String>,
    pub email_pw_reset_url: Option<String>,
}

/// Journey Data Services configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct JdsConfig {
    /// Base URL of the JDS service.
    pub jds_url: Option<String>,

    /// SAS token for journey (data store) reads.
    pub ds_sas_token: Option<String>,

    /// SAS token for tape (event ingest) writes.
    pub tape_sas_token: Option<String>,
}

/// Google Calendar configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GoogleCalendarConfig {
    /// Calendar identifier appointments are booked into.
    pub calendar_id: Option<String>,

    /// Service-account credential blob (JSON key file contents).
    pub service_account: Option<String>,

    /// Calendar API root; Google's public endpoint when unset.
    pub api_base: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FulfillmentConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.redmine.reject_unauthorized);
        assert_eq!(config.company.resolved_name(), FALLBACK_COMPANY_NAME);
    }

    #[test]
    fn test_empty_company_name_falls_back() {
        let company = CompanyConfig {
            default_name: Some(String::new()),
        };
        assert_eq!(company.resolved_name(), "Cisco");
    }

    #[test]
    fn test_partial_toml() {
        let config: FulfillmentConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [redmine]
            hostname = "redmine.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.redmine.hostname.as_deref(), Some("redmine.example.com"));
        assert_eq!(config.timeouts.request_secs, 30);
    }
}
