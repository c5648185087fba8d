//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::FulfillmentConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration.
///
/// The TOML file is optional; environment variables are applied on top of
/// it (or on top of the defaults when no file is given).
pub fn load_config(path: Option<&Path>) -> Result<FulfillmentConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load from a file, reading overrides through `env` instead of the process.
pub fn load_config_with_env<F>(path: Option<&Path>, env: F) -> Result<FulfillmentConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => FulfillmentConfig::default(),
    };

    apply_env_overrides(&mut config, env);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay the environment variables the deployment sets on the config.
///
/// Empty values count as unset.
pub fn apply_env_overrides<F>(config: &mut FulfillmentConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| env(key).filter(|v| !v.is_empty());

    if let Some(v) = var("BIND_ADDRESS") {
        config.listener.bind_address = v;
    }
    if let Some(v) = var("DEBUG") {
        config.observability.debug = true;
        tracing::trace!(value = %v, "DEBUG set, enabling debug logging");
    }
    if let Some(v) = var("COMPANY_NAME") {
        config.company.default_name = Some(v);
    }

    if let Some(v) = var("REDMINE_HOST") {
        config.redmine.hostname = Some(v);
    }
    if let Some(v) = var("REDMINE_APIKEY") {
        config.redmine.api_key = Some(v);
    }
    if let Some(v) = var("REJECT_UNAUTHORIZED") {
        config.redmine.reject_unauthorized = !v.eq_ignore_ascii_case("false") && v != "0";
    }

    if let Some(v) = var("SMS_SEND_OTP_URL") {
        config.webex_connect.sms_send_otp_url = Some(v);
    }
    if let Some(v) = var("SMS_SEND_PWRESET_URL") {
        config.webex_connect.sms_pw_reset_url = Some(v);
    }
    if let Some(v) = var("EMAIL_SEND_OTP_URL") {
        config.webex_connect.email_send_otp_url = Some(v);
    }
    if let Some(v) = var("EMAIL_SEND_PWRESET_URL") {
        config.webex_connect.email_pw_reset_url = Some(v);
    }

    if let Some(v) = var("JDS_URL") {
        config.jds.jds_url = Some(v);
    }
    if let Some(v) = var("JDS_SAS_TOKEN") {
        config.jds.ds_sas_token = Some(v);
    }
    if let Some(v) = var("JDS_TAPE_SAS_TOKEN") {
        config.jds.tape_sas_token = Some(v);
    }

    if let Some(v) = var("GOOGLE_CAL_ID") {
        config.google_calendar.calendar_id = Some(v);
    }
    if let Some(v) = var("GOOGLE_SERV_AUTH") {
        config.google_calendar.service_account = Some(v);
    }
}
