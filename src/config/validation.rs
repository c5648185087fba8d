//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check connector endpoints are well-formed URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FulfillmentConfig → Result<(), Vec<ValidationError>>
//! - Unset connector settings are valid; the connector reports them at call time

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::FulfillmentConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field}: '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("invalid {field}: '{value}' is not a URL")]
    InvalidUrl { field: &'static str, value: String },
}

/// Validate a loaded configuration.
pub fn validate_config(config: &FulfillmentConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.timeouts.connector_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.connector_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue("security.max_body_size"));
    }

    let urls = [
        ("webex_connect.sms_send_otp_url", &config.webex_connect.sms_send_otp_url),
        ("webex_connect.sms_pw_reset_url", &config.webex_connect.sms_pw_reset_url),
        ("webex_connect.email_send_otp_url", &config.webex_connect.email_send_otp_url),
        ("webex_connect.email_pw_reset_url", &config.webex_connect.email_pw_reset_url),
        ("jds.jds_url", &config.jds.jds_url),
        ("google_calendar.api_base", &config.google_calendar.api_base),
    ];
    for (field, value) in urls {
        if let Some(value) = value {
            if url::Url::parse(value).is_err() {
                errors.push(ValidationError::InvalidUrl {
                    field,
                    value: value.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&FulfillmentConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = FulfillmentConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 0;
        config.jds.jds_url = Some("::nope".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroValue("timeouts.request_secs")));
    }
}
