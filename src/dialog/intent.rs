//! Intent handlers and the action-keyed registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::connectors::{ConnectorRegistry, ConnectorResult};
use crate::dialog::context::DialogContext;
use crate::dialog::error::FulfillmentError;

/// Code invoked when the platform dispatches an action.
#[async_trait]
pub trait IntentHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &mut DialogContext,
        connectors: &ConnectorRegistry,
    ) -> ConnectorResult<()>;
}

/// Adapter for handlers that only touch the dialog context.
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F> IntentHandler for FnHandler<F>
where
    F: Fn(&mut DialogContext) + Send + Sync,
{
    async fn handle(&self, ctx: &mut DialogContext, _: &ConnectorRegistry) -> ConnectorResult<()> {
        (self.0)(ctx);
        Ok(())
    }
}

/// A named action and its handler.
#[derive(Clone)]
pub struct Intent {
    pub action: String,
    /// `false` when the handler answers with a follow-up event rather than
    /// waiting for user input.
    pub wait_for_reply: bool,
    pub handler: Arc<dyn IntentHandler>,
}

impl Intent {
    pub fn new<H: IntentHandler + 'static>(
        action: impl Into<String>,
        wait_for_reply: bool,
        handler: H,
    ) -> Self {
        Self {
            action: action.into(),
            wait_for_reply,
            handler: Arc::new(handler),
        }
    }

    /// Intent whose handler is a plain function of the dialog context.
    pub fn from_fn<F>(action: impl Into<String>, wait_for_reply: bool, f: F) -> Self
    where
        F: Fn(&mut DialogContext) + Send + Sync + 'static,
    {
        Self::new(action, wait_for_reply, FnHandler(f))
    }
}

impl std::fmt::Debug for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Intent")
            .field("action", &self.action)
            .field("wait_for_reply", &self.wait_for_reply)
            .finish_non_exhaustive()
    }
}

/// Intents keyed by action identifier.
#[derive(Debug, Default, Clone)]
pub struct IntentRegistry {
    intents: HashMap<String, Intent>,
}

impl IntentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an intent. Actions must be unique.
    pub fn register(&mut self, intent: Intent) -> Result<(), FulfillmentError> {
        if self.intents.contains_key(&intent.action) {
            return Err(FulfillmentError::DuplicateIntent(intent.action));
        }
        tracing::debug!(action = %intent.action, wait_for_reply = intent.wait_for_reply, "Intent registered");
        self.intents.insert(intent.action.clone(), intent);
        Ok(())
    }

    pub fn get(&self, action: &str) -> Option<&Intent> {
        self.intents.get(action)
    }

    pub fn contains(&self, action: &str) -> bool {
        self.intents.contains_key(action)
    }

    /// Registered actions, sorted.
    pub fn actions(&self) -> Vec<&str> {
        let mut actions: Vec<_> = self.intents.keys().map(String::as_str).collect();
        actions.sort_unstable();
        actions
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}
