//! Deployment-specific intents.

use crate::connectors::webex_cc::OFFER_SPEAK_TO_AGENT;
use crate::dialog::context::LAST_FULFILLMENT_TEXT;
use crate::dialog::{ConversationClientBuilder, DialogContext, FulfillmentError, Intent};

pub const EXAMPLE_INTENT: &str = "skill.some.example.intent";
pub const SPEAK_TO_LOAN_OFFICER: &str = "skill.speaktoloanofficer";

pub fn register_custom_intents(builder: &mut ConversationClientBuilder) -> Result<(), FulfillmentError> {
    builder.register_intent(Intent::from_fn(EXAMPLE_INTENT, true, |ctx| {
        ctx.append_fulfillment_text()
    }))?;
    builder.register_intent(Intent::from_fn(SPEAK_TO_LOAN_OFFICER, false, speak_to_loan_officer))?;
    Ok(())
}

fn speak_to_loan_officer(ctx: &mut DialogContext) {
    ctx.set_fulfillment_text();
    let last = ctx.param(LAST_FULFILLMENT_TEXT).map(str::to_string);
    ctx.respond_with_event(OFFER_SPEAK_TO_AGENT, last.as_deref());
}
