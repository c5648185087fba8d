//! Intents every deployment carries: greeting, fallback, one-time-password
//! verification, password reset, ticketing, journey lookup and agent
//! escalation.

use async_trait::async_trait;
use rand::Rng;
use serde_json::json;

use crate::connectors::redmine::{self, NewIssue, RedmineConnector};
use crate::connectors::webex_cc::{self, WebexCcConnector, DEFAULT_QUEUE, OFFER_SPEAK_TO_AGENT};
use crate::connectors::webex_connect::{self, WebexConnectConnector};
use crate::connectors::jds::{self, JdsConnector};
use crate::connectors::{Connector, ConnectorRegistry, ConnectorResult};
use crate::dialog::context::LAST_FULFILLMENT_TEXT;
use crate::dialog::{ConversationClientBuilder, DialogContext, FulfillmentError, Intent, IntentHandler};

pub const WELCOME: &str = "skill.welcome";
pub const FALLBACK: &str = "skill.fallback";
pub const SEND_OTP_SMS: &str = "skill.sendotp.sms";
pub const SEND_OTP_EMAIL: &str = "skill.sendotp.email";
pub const VALIDATE_OTP: &str = "skill.validateotp";
pub const PASSWORD_RESET_SMS: &str = "skill.passwordreset.sms";
pub const PASSWORD_RESET_EMAIL: &str = "skill.passwordreset.email";
pub const CREATE_TICKET: &str = "skill.createticket";
pub const JOURNEY_SUMMARY: &str = "skill.journey.summary";
pub const ESCALATE: &str = "skill.escalate";

/// Event raised when the caller has no destination on file.
pub const NO_CONTACT_EVENT: &str = "NoContactOnFile";
/// Event raised when the entered code does not match.
pub const OTP_FAILED_EVENT: &str = "OtpValidationFailed";

/// Register the common intent set.
pub fn register_common_modules(builder: &mut ConversationClientBuilder) -> Result<(), FulfillmentError> {
    builder.register_intent(Intent::from_fn(WELCOME, true, welcome))?;
    builder.register_intent(Intent::from_fn(FALLBACK, true, |ctx| ctx.append_fulfillment_text()))?;
    builder.register_intent(Intent::new(SEND_OTP_SMS, true, SendOtp { channel: Channel::Sms }))?;
    builder.register_intent(Intent::new(SEND_OTP_EMAIL, true, SendOtp { channel: Channel::Email }))?;
    builder.register_intent(Intent::from_fn(VALIDATE_OTP, true, validate_otp))?;
    builder.register_intent(Intent::new(
        PASSWORD_RESET_SMS,
        true,
        PasswordReset { channel: Channel::Sms },
    ))?;
    builder.register_intent(Intent::new(
        PASSWORD_RESET_EMAIL,
        true,
        PasswordReset { channel: Channel::Email },
    ))?;
    builder.register_intent(Intent::new(CREATE_TICKET, true, CreateTicket))?;
    builder.register_intent(Intent::new(JOURNEY_SUMMARY, true, JourneySummary))?;
    builder.register_intent(Intent::new(ESCALATE, false, Escalate))?;
    Ok(())
}

fn welcome(ctx: &mut DialogContext) {
    let name = ctx.param("customerName").unwrap_or_default().to_string();
    if !name.is_empty() {
        ctx.append_text(&format!("Hi {name}."));
    }
    ctx.append_fulfillment_text();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Sms,
    Email,
}

impl Channel {
    /// Where to reach the customer: this turn's parameter, then the
    /// session, then the channel payload.
    fn destination(self, ctx: &DialogContext) -> Option<String> {
        let (query_key, session_key, payload_key) = match self {
            Channel::Sms => ("phoneNumber", "customerPhone", "phoneNumber"),
            Channel::Email => ("email", "customerEmail", "email"),
        };
        ctx.query_param(query_key)
            .or_else(|| ctx.param(session_key).filter(|v| !v.is_empty()).map(str::to_string))
            .or_else(|| ctx.payload_str(payload_key))
    }
}

/// Six random digits.
pub fn generate_otp() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

struct SendOtp {
    channel: Channel,
}

#[async_trait]
impl IntentHandler for SendOtp {
    async fn handle(&self, ctx: &mut DialogContext, connectors: &ConnectorRegistry) -> ConnectorResult<()> {
        let Some(destination) = self.channel.destination(ctx) else {
            ctx.respond_with_event(NO_CONTACT_EVENT, None);
            return Ok(());
        };
        let connect = connectors.get::<WebexConnectConnector>(webex_connect::NAME)?;
        let company = ctx.param("companyName").unwrap_or_default().to_string();
        let otp = generate_otp();

        match self.channel {
            Channel::Sms => connect.send_sms_otp(&destination, &otp, &company).await?,
            Channel::Email => connect.send_email_otp(&destination, &otp, &company).await?,
        }

        ctx.set_param("otpCode", otp);
        ctx.set_param("otpAttempts", "0");
        ctx.append_fulfillment_text();
        Ok(())
    }
}

fn validate_otp(ctx: &mut DialogContext) {
    let expected = ctx.param("otpCode").unwrap_or_default().to_string();
    let entered: String = ctx
        .query_param("otp")
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();

    if !expected.is_empty() && entered == expected {
        ctx.set_param("customerValidated", "1");
        ctx.set_param("otpCode", "");
        ctx.append_fulfillment_text();
        return;
    }

    let attempts = ctx
        .param("otpAttempts")
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(0)
        + 1;
    ctx.set_param("otpAttempts", attempts.to_string());
    ctx.set_param("customerValidated", "0");
    ctx.respond_with_event(OTP_FAILED_EVENT, None);
}

struct PasswordReset {
    channel: Channel,
}

#[async_trait]
impl IntentHandler for PasswordReset {
    async fn handle(&self, ctx: &mut DialogContext, connectors: &ConnectorRegistry) -> ConnectorResult<()> {
        let Some(destination) = self.channel.destination(ctx) else {
            ctx.respond_with_event(NO_CONTACT_EVENT, None);
            return Ok(());
        };
        let connect = connectors.get::<WebexConnectConnector>(webex_connect::NAME)?;
        let name = ctx.param("customerName").unwrap_or_default().to_string();
        let company = ctx.param("companyName").unwrap_or_default().to_string();

        match self.channel {
            Channel::Sms => connect.send_sms_password_reset(&destination, &name, &company).await?,
            Channel::Email => {
                connect.send_email_password_reset(&destination, &name, &company).await?
            }
        }
        ctx.append_fulfillment_text();
        Ok(())
    }
}

struct CreateTicket;

#[async_trait]
impl IntentHandler for CreateTicket {
    async fn handle(&self, ctx: &mut DialogContext, connectors: &ConnectorRegistry) -> ConnectorResult<()> {
        let redmine = connectors.get::<RedmineConnector>(redmine::NAME)?;
        let subject = ctx
            .query_param("issueSummary")
            .unwrap_or_else(|| ctx.request().query_result.query_text.clone());
        let customer = ctx.param("customerName").unwrap_or_default();
        let description = format!(
            "Opened by virtual agent.\nCustomer: {}\nValidated: {}\nRequest: {}",
            if customer.is_empty() { "unknown" } else { customer },
            ctx.param("customerValidated").unwrap_or("0"),
            ctx.request().query_result.query_text,
        );
        let issue = NewIssue {
            project_id: redmine.project_id().to_string(),
            subject,
            description,
        };

        let id = redmine.create_issue(&issue).await?;
        ctx.set_param("ticketNumber", id.to_string());
        ctx.append_fulfillment_text();
        Ok(())
    }
}

struct JourneySummary;

#[async_trait]
impl IntentHandler for JourneySummary {
    async fn handle(&self, ctx: &mut DialogContext, connectors: &ConnectorRegistry) -> ConnectorResult<()> {
        let jds = connectors.get::<JdsConnector>(jds::NAME)?;
        let identity = Channel::Sms
            .destination(ctx)
            .or_else(|| Channel::Email.destination(ctx));
        let Some(identity) = identity else {
            ctx.append_fulfillment_text();
            return Ok(());
        };

        let events = jds.fetch_journey(&identity).await?;
        ctx.set_param("journeyEventCount", events.len().to_string());
        if let Some(last) = jds::latest_event(&events) {
            ctx.set_param("lastJourneyEvent", last.event_type.clone());
        }
        ctx.append_fulfillment_text();
        Ok(())
    }
}

struct Escalate;

#[async_trait]
impl IntentHandler for Escalate {
    async fn handle(&self, ctx: &mut DialogContext, connectors: &ConnectorRegistry) -> ConnectorResult<()> {
        let wxcc = connectors.get::<WebexCcConnector>(webex_cc::NAME)?;
        if !wxcc.escalation_pending(ctx) {
            let queue = ctx.query_param("queue").unwrap_or_else(|| DEFAULT_QUEUE.to_string());
            wxcc.prepare_escalation(ctx, &queue, "customer request");
            tape_escalation(ctx, connectors, &queue).await;
        }
        ctx.set_fulfillment_text();
        let last = ctx.param(LAST_FULFILLMENT_TEXT).map(str::to_string);
        ctx.respond_with_event(OFFER_SPEAK_TO_AGENT, last.as_deref());
        Ok(())
    }
}

/// Record the hand-off on the customer's journey. Best effort: the turn
/// goes ahead when JDS is unset or rejects the event.
async fn tape_escalation(ctx: &DialogContext, connectors: &ConnectorRegistry, queue: &str) {
    let Ok(jds) = connectors.get::<JdsConnector>(jds::NAME) else {
        return;
    };
    if !jds.is_configured() {
        return;
    }
    let Some(identity) = Channel::Sms
        .destination(ctx)
        .or_else(|| Channel::Email.destination(ctx))
    else {
        return;
    };
    let event = JdsConnector::interaction_event(&identity, ESCALATE, json!({ "queue": queue }));
    if let Err(e) = jds.tape_event(&event).await {
        tracing::warn!(error = %e, "Failed to tape escalation");
    }
}
