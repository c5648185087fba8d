//! Webex Contact Center Journey Data Services connector.
//!
//! # Responsibilities
//! - Read a customer's recent journey events (data store SAS token)
//! - Post bot interaction events to the tape (tape SAS token)
//!
//! Both tokens travel as the `Authorization: SharedAccessSignature ...`
//! header.

use std::any::Any;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::JdsConfig;
use crate::connectors::types::{http_client, json, required, send, Connector, ConnectorResult};

pub const NAME: &str = "jds";

/// CloudEvents-style journey event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub source: String,
    pub identity: String,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
struct EventPage {
    #[serde(default)]
    data: Vec<JourneyEvent>,
}

pub struct JdsConnector {
    config: JdsConfig,
    client: reqwest::Client,
}

impl JdsConnector {
    pub fn new(config: JdsConfig, timeout: Duration) -> ConnectorResult<Self> {
        let client = http_client(NAME, timeout, true)?;
        Ok(Self { config, client })
    }

    fn base_url(&self) -> ConnectorResult<&str> {
        required(NAME, "jds_url", &self.config.jds_url).map(|u| u.trim_end_matches('/'))
    }

    /// Most recent journey events for `identity` (phone or email).
    pub async fn fetch_journey(&self, identity: &str) -> ConnectorResult<Vec<JourneyEvent>> {
        let token = required(NAME, "ds_sas_token", &self.config.ds_sas_token)?;
        let url = format!("{}/events", self.base_url()?);
        let request = self
            .client
            .get(url)
            .header("Authorization", token)
            .query(&[("identity", identity)]);
        let page: EventPage = json(NAME, send(NAME, request).await?).await?;
        tracing::debug!(events = page.data.len(), "Journey fetched");
        Ok(page.data)
    }

    /// Record an event on the customer's journey.
    pub async fn tape_event(&self, event: &JourneyEvent) -> ConnectorResult<()> {
        let token = required(NAME, "tape_sas_token", &self.config.tape_sas_token)?;
        let url = format!("{}/publish/v1/api/event", self.base_url()?);
        let request = self.client.post(url).header("Authorization", token).json(event);
        send(NAME, request).await?;
        Ok(())
    }

    /// Build a bot interaction event for the tape.
    pub fn interaction_event(identity: &str, action: &str, data: Value) -> JourneyEvent {
        JourneyEvent {
            id: uuid::Uuid::new_v4().to_string(),
            event_type: format!("bot:{action}"),
            source: "fulfillment-webhook".to_string(),
            identity: identity.to_string(),
            time: Some(Utc::now()),
            data,
        }
    }
}

/// The most recent event by `time`; undated events sort oldest.
pub fn latest_event(events: &[JourneyEvent]) -> Option<&JourneyEvent> {
    events.iter().max_by_key(|e| e.time)
}

impl Connector for JdsConnector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_configured(&self) -> bool {
        self.config.jds_url.is_some()
            && (self.config.ds_sas_token.is_some() || self.config.tape_sas_token.is_some())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_interaction_event() {
        let event = JdsConnector::interaction_event("+15550100", "skill.welcome", json!({"k": 1}));
        assert_eq!(event.event_type, "bot:skill.welcome");
        assert_eq!(event.identity, "+15550100");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "bot:skill.welcome");
    }

    #[test]
    fn test_latest_event_ignores_order() {
        let event = |id: &str, time: Option<&str>| JourneyEvent {
            id: id.to_string(),
            event_type: format!("type:{id}"),
            source: "wxcc".to_string(),
            identity: "+15550100".to_string(),
            time: time.map(|t| DateTime::parse_from_rfc3339(t).unwrap().with_timezone(&Utc)),
            data: Value::Null,
        };
        let events = vec![
            event("old", Some("2024-01-01T00:00:00Z")),
            event("undated", None),
            event("new", Some("2024-03-01T00:00:00Z")),
            event("mid", Some("2024-02-01T00:00:00Z")),
        ];
        assert_eq!(latest_event(&events).unwrap().id, "new");
        assert!(latest_event(&[]).is_none());
    }

    #[test]
    fn test_event_page_decodes() {
        let page: EventPage = serde_json::from_value(json!({
            "data": [{
                "id": "e1",
                "type": "task:new",
                "source": "wxcc",
                "identity": "+15550100",
                "time": "2024-01-01T00:00:00Z",
                "data": { "channelType": "telephony" }
            }]
        }))
        .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].event_type, "task:new");
        assert!(page.data[0].time.is_some());
    }
}
