//! Appointment booking against the Google Calendar connector.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::connectors::google_calendar::{self, GoogleCalendarConnector};
use crate::connectors::{ConnectorRegistry, ConnectorResult};
use crate::dialog::{ConversationClientBuilder, DialogContext, FulfillmentError, Intent, IntentHandler};

pub const CHECK: &str = "skill.appointment.check";
pub const BOOK: &str = "skill.appointment.book";

/// Event raised when the requested slot is taken.
pub const SLOT_TAKEN_EVENT: &str = "AppointmentSlotTaken";
/// Event raised when date or time could not be understood.
pub const INVALID_SLOT_EVENT: &str = "AppointmentInvalidSlot";

const DEFAULT_MINUTES: i64 = 30;
/// Longest bookable slot; anything longer is not a valid request.
const MAX_MINUTES: i64 = 24 * 60;

pub fn register_module_appointment_booking(
    builder: &mut ConversationClientBuilder,
) -> Result<(), FulfillmentError> {
    builder.register_intent(Intent::new(CHECK, true, CheckAvailability))?;
    builder.register_intent(Intent::new(BOOK, true, BookAppointment))?;
    Ok(())
}

/// Combine the date part of `date` and the time-of-day part of `time`
/// (both RFC 3339, as the platform's date/time entities produce them).
pub fn appointment_slot(
    date: &str,
    time: &str,
    minutes: i64,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let day = date.get(..10)?;
    let clock = time.get(10..)?;
    let start = DateTime::parse_from_rfc3339(&format!("{day}{clock}"))
        .ok()?
        .with_timezone(&Utc);
    let end = start.checked_add_signed(Duration::try_minutes(minutes)?)?;
    Some((start, end))
}

/// Requested slot from this turn's parameters or the session.
fn requested_slot(ctx: &DialogContext) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let lookup = |key: &str| {
        ctx.query_param(key)
            .or_else(|| ctx.param(key).filter(|v| !v.is_empty()).map(str::to_string))
    };
    let date = lookup("date")?;
    let time = lookup("time")?;
    let minutes = match lookup("appointmentMinutes").and_then(|m| m.parse::<f64>().ok()) {
        Some(m) if m > MAX_MINUTES as f64 => return None,
        Some(m) if m >= 1.0 => m as i64,
        _ => DEFAULT_MINUTES,
    };
    appointment_slot(&date, &time, minutes)
}

struct CheckAvailability;

#[async_trait]
impl IntentHandler for CheckAvailability {
    async fn handle(&self, ctx: &mut DialogContext, connectors: &ConnectorRegistry) -> ConnectorResult<()> {
        let Some((start, end)) = requested_slot(ctx) else {
            ctx.respond_with_event(INVALID_SLOT_EVENT, None);
            return Ok(());
        };
        let calendar = connectors.get::<GoogleCalendarConnector>(google_calendar::NAME)?;

        let free = calendar.is_slot_free(start, end).await?;
        ctx.set_param("appointmentStart", start.to_rfc3339());
        ctx.set_param("appointmentEnd", end.to_rfc3339());
        ctx.set_param("appointmentAvailable", if free { "1" } else { "0" });
        if free {
            ctx.append_fulfillment_text();
        } else {
            ctx.respond_with_event(SLOT_TAKEN_EVENT, None);
        }
        Ok(())
    }
}

struct BookAppointment;

#[async_trait]
impl IntentHandler for BookAppointment {
    async fn handle(&self, ctx: &mut DialogContext, connectors: &ConnectorRegistry) -> ConnectorResult<()> {
        let Some((start, end)) = requested_slot(ctx) else {
            ctx.respond_with_event(INVALID_SLOT_EVENT, None);
            return Ok(());
        };
        let calendar = connectors.get::<GoogleCalendarConnector>(google_calendar::NAME)?;

        if !calendar.is_slot_free(start, end).await? {
            ctx.set_param("appointmentAvailable", "0");
            ctx.respond_with_event(SLOT_TAKEN_EVENT, None);
            return Ok(());
        }

        let customer = match ctx.param("customerName") {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => "Customer".to_string(),
        };
        let company = ctx.param("companyName").unwrap_or_default().to_string();
        let summary = format!("{company} appointment: {customer}");
        let description = format!("Booked by virtual agent for {customer}.");

        let event = calendar
            .insert_event(summary.trim(), Some(&description), start, end)
            .await?;
        ctx.set_param("appointmentBooked", "1");
        if let Some(id) = event.id {
            ctx.set_param("appointmentId", id);
        }
        ctx.append_fulfillment_text();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::context::ContextParams;
    use crate::dialog::WebhookRequest;
    use serde_json::json;

    #[test]
    fn test_slot_combines_date_and_time() {
        let (start, end) = appointment_slot(
            "2024-05-01T12:00:00-04:00",
            "2024-04-28T15:30:00-04:00",
            45,
        )
        .unwrap();
        assert_eq!(start.to_rfc3339(), "2024-05-01T19:30:00+00:00");
        assert_eq!((end - start).num_minutes(), 45);
    }

    #[test]
    fn test_slot_rejects_garbage() {
        assert!(appointment_slot("tomorrow", "noon", 30).is_none());
        assert!(appointment_slot("2024-05-01", "", 30).is_none());
        assert!(appointment_slot("2024-05-01T12:00:00Z", "2024-05-01T10:00:00Z", i64::MAX).is_none());
    }

    #[tokio::test]
    async fn test_oversized_length_raises_invalid_slot() {
        let request: WebhookRequest = serde_json::from_value(json!({ "queryResult": { "parameters": {
            "date": "2024-05-01T12:00:00Z",
            "time": "2024-05-01T10:00:00Z",
            "appointmentMinutes": 1.0e12
        } } }))
        .unwrap();
        let mut ctx = DialogContext::new(request, ContextParams::new());
        assert!(requested_slot(&ctx).is_none());

        CheckAvailability
            .handle(&mut ctx, &ConnectorRegistry::new())
            .await
            .unwrap();
        assert_eq!(ctx.followup_event().unwrap().name, INVALID_SLOT_EVENT);
    }

    #[test]
    fn test_length_at_limit_accepted() {
        let request: WebhookRequest = serde_json::from_value(json!({ "queryResult": { "parameters": {
            "date": "2024-05-01T00:00:00Z",
            "time": "2024-05-01T08:00:00Z",
            "appointmentMinutes": 1440
        } } }))
        .unwrap();
        let ctx = DialogContext::new(request, ContextParams::new());
        let (start, end) = requested_slot(&ctx).unwrap();
        assert_eq!((end - start).num_minutes(), MAX_MINUTES);
    }

    #[tokio::test]
    async fn test_missing_slot_raises_event() {
        let request: WebhookRequest =
            serde_json::from_value(json!({ "queryResult": { "parameters": {} } })).unwrap();
        let mut ctx = DialogContext::new(request, ContextParams::new());
        CheckAvailability
            .handle(&mut ctx, &ConnectorRegistry::new())
            .await
            .unwrap();
        assert_eq!(ctx.followup_event().unwrap().name, INVALID_SLOT_EVENT);
    }

    #[test]
    fn test_requested_slot_from_session() {
        let request: WebhookRequest =
            serde_json::from_value(json!({ "queryResult": { "parameters": { "time": "2024-04-28T09:00:00Z" } } }))
                .unwrap();
        let params: ContextParams = [("date", "2024-05-02T00:00:00Z"), ("appointmentMinutes", "60")]
            .into_iter()
            .collect();
        let ctx = DialogContext::new(request, params);
        let (start, end) = requested_slot(&ctx).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-05-02T09:00:00+00:00");
        assert_eq!((end - start).num_minutes(), 60);
    }
}
