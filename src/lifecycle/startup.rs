//! Startup orchestration.
//!
//! # Responsibilities
//! - Build every connector from the validated configuration
//! - Assemble the conversation client with its callbacks and intent sets
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Registration happens once, before the listener is bound

use std::time::Duration;

use thiserror::Error;

use crate::config::{ConfigError, FulfillmentConfig};
use crate::connectors::{
    ConnectorError, GoogleCalendarConnector, JdsConnector, RedmineConnector, RedmineLookup,
    WebexCcConnector, WebexConnectConnector,
};
use crate::dialog::payload::{base_params, payload_populator};
use crate::dialog::{ConversationClient, ConversationClientBuilder, FulfillmentError};
use crate::modules::{
    register_common_modules, register_custom_intents, register_module_appointment_booking,
    register_module_covid_screen,
};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("connector setup failed: {0}")]
    Connector(#[from] ConnectorError),

    #[error("intent registration failed: {0}")]
    Intent(#[from] FulfillmentError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build and register the standard connector set.
pub fn register_connectors(
    builder: &mut ConversationClientBuilder,
    config: &FulfillmentConfig,
) -> Result<(), ConnectorError> {
    let timeout = Duration::from_secs(config.timeouts.connector_secs);

    builder.register_connector(WebexCcConnector::new())?;
    builder.register_connector(RedmineConnector::new(config.redmine.clone(), timeout)?)?;
    builder.register_connector(WebexConnectConnector::new(config.webex_connect.clone(), timeout)?)?;
    builder.register_connector(JdsConnector::new(config.jds.clone(), timeout)?)?;
    builder.register_connector(GoogleCalendarConnector::new(
        config.google_calendar.clone(),
        timeout,
    )?)?;
    Ok(())
}

/// Assemble the conversation client for this deployment.
pub fn build_client(config: &FulfillmentConfig) -> Result<ConversationClient, StartupError> {
    let mut builder = ConversationClientBuilder::new(base_params())
        .populate_from_payload(payload_populator(config.company.resolved_name()))
        .populate_from_lookup(RedmineLookup);

    register_connectors(&mut builder, config)?;
    register_common_modules(&mut builder)?;
    register_module_covid_screen(&mut builder)?;
    register_module_appointment_booking(&mut builder)?;
    register_custom_intents(&mut builder)?;

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::{redmine, webex_cc, Connector};
    use crate::modules::custom::{EXAMPLE_INTENT, SPEAK_TO_LOAN_OFFICER};

    #[test]
    fn test_build_client_registers_everything() {
        let client = build_client(&FulfillmentConfig::default()).unwrap();
        assert_eq!(
            client.connectors().names(),
            vec!["google_calendar", "jds", "redmine", "webex_cc", "webex_connect"]
        );
        assert!(client.connectors().get::<WebexCcConnector>(webex_cc::NAME).is_ok());
        assert!(!client
            .connectors()
            .get::<RedmineConnector>(redmine::NAME)
            .unwrap()
            .is_configured());

        assert!(client.intents().contains(EXAMPLE_INTENT));
        assert!(client.intents().contains(SPEAK_TO_LOAN_OFFICER));
        assert!(!client.intents().get(SPEAK_TO_LOAN_OFFICER).unwrap().wait_for_reply);
        assert!(client.intents().contains("skill.appointment.book"));
        assert!(client.intents().contains("skill.covidscreen.result"));
    }

    #[test]
    fn test_connectors_registered_once() {
        let mut builder = ConversationClientBuilder::new(base_params());
        register_connectors(&mut builder, &FulfillmentConfig::default()).unwrap();
        assert!(matches!(
            register_connectors(&mut builder, &FulfillmentConfig::default()),
            Err(ConnectorError::Duplicate("webex_cc"))
        ));
    }

    #[test]
    fn test_bad_service_account_fails_startup() {
        let mut config = FulfillmentConfig::default();
        config.google_calendar.service_account = Some("not json".into());
        assert!(matches!(
            build_client(&config),
            Err(StartupError::Connector(ConnectorError::Auth { .. }))
        ));
    }
}
