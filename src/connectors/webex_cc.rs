//! Webex Contact Center telephony connector.
//!
//! The contact center reads hand-off instructions from the session
//! parameters when the virtual agent ends its turn, so escalation is a
//! matter of setting the right parameters and raising the agent event.

use std::any::Any;

use crate::connectors::types::Connector;
use crate::dialog::context::DialogContext;

pub const NAME: &str = "webex_cc";

/// Event the agent handles by offering a transfer to a human.
pub const OFFER_SPEAK_TO_AGENT: &str = "OfferSpeakToAgent";

/// Queue used when the caller names none.
pub const DEFAULT_QUEUE: &str = "General";

#[derive(Debug, Default, Clone)]
pub struct WebexCcConnector;

impl WebexCcConnector {
    pub fn new() -> Self {
        Self
    }

    /// Flag the session for transfer to `queue`.
    pub fn prepare_escalation(&self, ctx: &mut DialogContext, queue: &str, reason: &str) {
        ctx.set_param("wxccEscalate", "1");
        ctx.set_param("wxccQueue", queue);
        ctx.set_param("wxccEscalationReason", reason);
        tracing::debug!(queue, reason, "Escalation prepared");
    }

    /// Whether an earlier turn already asked for a transfer.
    pub fn escalation_pending(&self, ctx: &DialogContext) -> bool {
        ctx.param("wxccEscalate") == Some("1")
    }
}

impl Connector for WebexCcConnector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
