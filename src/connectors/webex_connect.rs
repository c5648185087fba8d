//! Webex Connect connector for SMS and email one-time passwords.
//!
//! Each operation triggers a Webex Connect flow through its inbound webhook
//! URL; the flow owns templating and delivery.

use std::any::Any;
use std::time::Duration;

use serde::Serialize;

use crate::config::WebexConnectConfig;
use crate::connectors::types::{http_client, required, send, Connector, ConnectorResult};

pub const NAME: &str = "webex_connect";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FlowTrigger<'a> {
    destination: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    otp: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_name: Option<&'a str>,
    company_name: &'a str,
}

/// Which flow to trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    SmsOtp,
    SmsPasswordReset,
    EmailOtp,
    EmailPasswordReset,
}

pub struct WebexConnectConnector {
    config: WebexConnectConfig,
    client: reqwest::Client,
}

impl WebexConnectConnector {
    pub fn new(config: WebexConnectConfig, timeout: Duration) -> ConnectorResult<Self> {
        let client = http_client(NAME, timeout, true)?;
        Ok(Self { config, client })
    }

    fn flow_url(&self, flow: Flow) -> ConnectorResult<&str> {
        match flow {
            Flow::SmsOtp => required(NAME, "sms_send_otp_url", &self.config.sms_send_otp_url),
            Flow::SmsPasswordReset => {
                required(NAME, "sms_pw_reset_url", &self.config.sms_pw_reset_url)
            }
            Flow::EmailOtp => required(NAME, "email_send_otp_url", &self.config.email_send_otp_url),
            Flow::EmailPasswordReset => {
                required(NAME, "email_pw_reset_url", &self.config.email_pw_reset_url)
            }
        }
    }

    async fn trigger(&self, flow: Flow, body: &FlowTrigger<'_>) -> ConnectorResult<()> {
        let url = self.flow_url(flow)?;
        send(NAME, self.client.post(url).json(body)).await?;
        tracing::info!(?flow, "Webex Connect flow triggered");
        Ok(())
    }

    /// Text a one-time password to `phone`.
    pub async fn send_sms_otp(&self, phone: &str, otp: &str, company: &str) -> ConnectorResult<()> {
        let body = FlowTrigger {
            destination: phone,
            otp: Some(otp),
            customer_name: None,
            company_name: company,
        };
        self.trigger(Flow::SmsOtp, &body).await
    }

    /// Text a password-reset link to `phone`.
    pub async fn send_sms_password_reset(
        &self,
        phone: &str,
        customer_name: &str,
        company: &str,
    ) -> ConnectorResult<()> {
        let body = FlowTrigger {
            destination: phone,
            otp: None,
            customer_name: Some(customer_name),
            company_name: company,
        };
        self.trigger(Flow::SmsPasswordReset, &body).await
    }

    /// Email a one-time password to `email`.
    pub async fn send_email_otp(&self, email: &str, otp: &str, company: &str) -> ConnectorResult<()> {
        let body = FlowTrigger {
            destination: email,
            otp: Some(otp),
            customer_name: None,
            company_name: company,
        };
        self.trigger(Flow::EmailOtp, &body).await
    }

    /// Email a password-reset link to `email`.
    pub async fn send_email_password_reset(
        &self,
        email: &str,
        customer_name: &str,
        company: &str,
    ) -> ConnectorResult<()> {
        let body = FlowTrigger {
            destination: email,
            otp: None,
            customer_name: Some(customer_name),
            company_name: company,
        };
        self.trigger(Flow::EmailPasswordReset, &body).await
    }
}

impl Connector for WebexConnectConnector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_configured(&self) -> bool {
        self.config.sms_send_otp_url.is_some() || self.config.email_send_otp_url.is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
