//! Connector trait, registry and error definitions.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::observability::metrics;

/// Errors that can occur while talking to an external system.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// A required setting (URL, token, credential) was not provided.
    #[error("{connector} not configured: missing {setting}")]
    NotConfigured {
        connector: &'static str,
        setting: &'static str,
    },

    /// No connector with this name was registered at startup.
    #[error("connector '{0}' is not registered")]
    NotRegistered(&'static str),

    /// A connector with this name was already registered.
    #[error("connector '{0}' registered twice")]
    Duplicate(&'static str),

    /// Transport-level failure (DNS, TLS, timeout, ...).
    #[error("{connector} request failed: {source}")]
    Http {
        connector: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The remote system answered with a non-success status.
    #[error("{connector} returned status {status}: {body}")]
    Status {
        connector: &'static str,
        status: u16,
        body: String,
    },

    /// The response body could not be understood.
    #[error("{connector} response could not be decoded: {reason}")]
    Decode {
        connector: &'static str,
        reason: String,
    },

    /// Credential handling failed.
    #[error("{connector} authentication failed: {reason}")]
    Auth {
        connector: &'static str,
        reason: String,
    },
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// An adapter for one external system.
pub trait Connector: Send + Sync + 'static {
    /// Registry key.
    fn name(&self) -> &'static str;

    /// Whether every setting the connector needs is present.
    fn is_configured(&self) -> bool;

    fn as_any(&self) -> &dyn Any;
}

/// Connectors registered at startup, keyed by name.
#[derive(Default, Clone)]
pub struct ConnectorRegistry {
    connectors: HashMap<&'static str, Arc<dyn Connector>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connector. Names must be unique.
    pub fn register<C: Connector>(&mut self, connector: C) -> ConnectorResult<()> {
        let name = connector.name();
        if self.connectors.contains_key(name) {
            return Err(ConnectorError::Duplicate(name));
        }
        tracing::info!(
            connector = name,
            configured = connector.is_configured(),
            "Connector registered"
        );
        self.connectors.insert(name, Arc::new(connector));
        Ok(())
    }

    /// Look up a connector by name and concrete type.
    pub fn get<C: Connector>(&self, name: &'static str) -> ConnectorResult<&C> {
        self.connectors
            .get(name)
            .and_then(|c| c.as_any().downcast_ref::<C>())
            .ok_or(ConnectorError::NotRegistered(name))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.connectors.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

/// Build the shared HTTP client used by a connector.
pub(crate) fn http_client(
    connector: &'static str,
    timeout: Duration,
    verify_tls: bool,
) -> ConnectorResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(!verify_tls)
        .build()
        .map_err(|source| ConnectorError::Http { connector, source })
}

/// Send a request and turn non-success answers into `ConnectorError::Status`.
///
/// Every call is counted in the connector metrics.
pub(crate) async fn send(
    connector: &'static str,
    request: reqwest::RequestBuilder,
) -> ConnectorResult<reqwest::Response> {
    let response = match request.send().await {
        Ok(response) => response,
        Err(source) => {
            metrics::record_connector_call(connector, false);
            return Err(ConnectorError::Http { connector, source });
        }
    };

    let status = response.status();
    metrics::record_connector_call(connector, status.is_success());
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(connector, status = status.as_u16(), "Connector call rejected");
    Err(ConnectorError::Status {
        connector,
        status: status.as_u16(),
        body,
    })
}

/// Decode a JSON response body.
pub(crate) async fn json<T: serde::de::DeserializeOwned>(
    connector: &'static str,
    response: reqwest::Response,
) -> ConnectorResult<T> {
    response.json().await.map_err(|e| ConnectorError::Decode {
        connector,
        reason: e.to_string(),
    })
}

/// Require an optional setting.
pub(crate) fn required<'a>(
    connector: &'static str,
    setting: &'static str,
    value: &'a Option<String>,
) -> ConnectorResult<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(ConnectorError::NotConfigured { connector, setting })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy;

    impl Connector for Dummy {
        fn name(&self) -> &'static str {
            "dummy"
        }
        fn is_configured(&self) -> bool {
            true
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ConnectorRegistry::new();
        registry.register(Dummy).unwrap();
        assert!(registry.get::<Dummy>("dummy").is_ok());
        assert!(matches!(
            registry.get::<Dummy>("other"),
            Err(ConnectorError::NotRegistered("other"))
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = ConnectorRegistry::new();
        registry.register(Dummy).unwrap();
        assert!(matches!(
            registry.register(Dummy),
            Err(ConnectorError::Duplicate("dummy"))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_required_setting() {
        let missing = None;
        let err = required("jds", "jds_url", &missing).unwrap_err();
        assert_eq!(err.to_string(), "jds not configured: missing jds_url");
        let empty = Some(String::new());
        assert!(required("jds", "jds_url", &empty).is_err());
    }
}
