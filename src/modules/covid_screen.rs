//! COVID-19 pre-visit screening questionnaire.
//!
//! Each answer intent carries a yes/no `answer` parameter; the result
//! intent routes callers with any "yes" to the failed-screen event.

use crate::dialog::{ConversationClientBuilder, DialogContext, FulfillmentError, Intent};

pub const ANSWER: &str = "skill.covidscreen.answer";
pub const RESULT: &str = "skill.covidscreen.result";

pub const FAILED_EVENT: &str = "CovidScreenFailed";

const YES_COUNT: &str = "covidYesCount";
const ANSWERED: &str = "covidQuestionsAnswered";

pub fn register_module_covid_screen(
    builder: &mut ConversationClientBuilder,
) -> Result<(), FulfillmentError> {
    builder.register_intent(Intent::from_fn(ANSWER, true, record_answer))?;
    builder.register_intent(Intent::from_fn(RESULT, false, screen_result))?;
    Ok(())
}

fn counter(ctx: &DialogContext, key: &str) -> u32 {
    ctx.param(key).and_then(|v| v.parse().ok()).unwrap_or(0)
}

fn record_answer(ctx: &mut DialogContext) {
    let yes = ctx
        .query_param("answer")
        .map(|a| matches!(a.trim().to_ascii_lowercase().as_str(), "yes" | "y" | "true"))
        .unwrap_or(false);

    let answered = counter(ctx, ANSWERED) + 1;
    ctx.set_param(ANSWERED, answered.to_string());
    if yes {
        let count = counter(ctx, YES_COUNT) + 1;
        ctx.set_param(YES_COUNT, count.to_string());
    }
    ctx.append_fulfillment_text();
}

fn screen_result(ctx: &mut DialogContext) {
    if counter(ctx, YES_COUNT) > 0 {
        ctx.set_param("covidScreenPassed", "0");
        ctx.respond_with_event(FAILED_EVENT, None);
    } else {
        ctx.set_param("covidScreenPassed", "1");
        ctx.append_fulfillment_text();
    }
}
