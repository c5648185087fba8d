//! Redmine ticketing connector.
//!
//! # Responsibilities
//! - Look customers up by phone number or email (`/users.json`)
//! - File support tickets (`/issues.json`)
//! - Fill session parameters from the lookup on the first turn

use std::any::Any;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::RedmineConfig;
use crate::connectors::types::{
    http_client, json, required, send, Connector, ConnectorRegistry, ConnectorResult,
};
use crate::dialog::client::LookupPopulator;
use crate::dialog::context::DialogContext;

pub const NAME: &str = "redmine";

/// A Redmine user record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RedmineUser {
    pub id: u64,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub mail: String,
}

impl RedmineUser {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
struct UsersPage {
    #[serde(default)]
    users: Vec<RedmineUser>,
}

/// Fields of a new issue.
#[derive(Debug, Clone, Serialize)]
pub struct NewIssue {
    pub project_id: String,
    pub subject: String,
    pub description: String,
}

#[derive(Serialize)]
struct IssueEnvelope<'a> {
    issue: &'a NewIssue,
}

#[derive(Deserialize)]
struct CreatedIssue {
    issue: CreatedIssueId,
}

#[derive(Deserialize)]
struct CreatedIssueId {
    id: u64,
}

pub struct RedmineConnector {
    config: RedmineConfig,
    client: reqwest::Client,
}

impl RedmineConnector {
    pub fn new(config: RedmineConfig, timeout: Duration) -> ConnectorResult<Self> {
        let client = http_client(NAME, timeout, config.reject_unauthorized)?;
        Ok(Self { config, client })
    }

    pub fn project_id(&self) -> &str {
        &self.config.project_id
    }

    /// Base URL; a bare host name is assumed to speak HTTPS.
    fn base_url(&self) -> ConnectorResult<String> {
        let host = required(NAME, "hostname", &self.config.hostname)?;
        let host = host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            Ok(host.to_string())
        } else {
            Ok(format!("https://{host}"))
        }
    }

    fn api_key(&self) -> ConnectorResult<&str> {
        required(NAME, "api_key", &self.config.api_key)
    }

    async fn search_users(&self, term: &str) -> ConnectorResult<Option<RedmineUser>> {
        let url = format!("{}/users.json", self.base_url()?);
        let request = self
            .client
            .get(&url)
            .header("X-Redmine-API-Key", self.api_key()?)
            .query(&[("name", term), ("limit", "1")]);
        let page: UsersPage = json(NAME, send(NAME, request).await?).await?;
        Ok(page.users.into_iter().next())
    }

    pub async fn find_user_by_phone(&self, phone: &str) -> ConnectorResult<Option<RedmineUser>> {
        let digits: String = phone.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect();
        self.search_users(&digits).await
    }

    pub async fn find_user_by_email(&self, email: &str) -> ConnectorResult<Option<RedmineUser>> {
        self.search_users(email.trim()).await
    }

    /// File an issue and return its id.
    pub async fn create_issue(&self, issue: &NewIssue) -> ConnectorResult<u64> {
        let url = format!("{}/issues.json", self.base_url()?);
        let request = self
            .client
            .post(&url)
            .header("X-Redmine-API-Key", self.api_key()?)
            .json(&IssueEnvelope { issue });
        let created: CreatedIssue = json(NAME, send(NAME, request).await?).await?;
        tracing::info!(issue_id = created.issue.id, "Redmine issue created");
        Ok(created.issue.id)
    }
}

impl Connector for RedmineConnector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_configured(&self) -> bool {
        self.config.hostname.is_some() && self.config.api_key.is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Identify the customer from the channel payload on a new session.
///
/// Tries `phoneNumber` first, then `email`. Lookup failures are logged and
/// leave the session untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct RedmineLookup;

#[async_trait]
impl LookupPopulator for RedmineLookup {
    async fn populate(&self, ctx: &mut DialogContext, connectors: &ConnectorRegistry) {
        let redmine = match connectors.get::<RedmineConnector>(NAME) {
            Ok(r) if r.is_configured() => r,
            _ => {
                tracing::debug!("Redmine not configured, skipping customer lookup");
                return;
            }
        };

        let (found, identified_by) = if let Some(phone) = ctx.payload_str("phoneNumber") {
            (redmine.find_user_by_phone(&phone).await, "phone")
        } else if let Some(email) = ctx.payload_str("email") {
            (redmine.find_user_by_email(&email).await, "email")
        } else {
            return;
        };

        match found {
            Ok(Some(user)) => {
                tracing::info!(user_id = user.id, identified_by, "Customer identified");
                ctx.set_param("customerName", user.display_name());
                ctx.set_param("customerIdentified", "1");
                ctx.set_param("customerIdentifiedBy", identified_by);
                ctx.set_param("customerEmail", user.mail);
                ctx.set_param("redmineUserId", user.id.to_string());
            }
            Ok(None) => tracing::info!(identified_by, "No Redmine user matched"),
            Err(e) => tracing::warn!(error = %e, "Redmine lookup failed"),
        }
    }
}
