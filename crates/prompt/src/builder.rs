//! Placeholder substitution for the turn and summary templates.

use crate::{PromptError, TemplateKind, TemplateLoader};

pub const PERSONA_PLACEHOLDER: &str = "{persona_name}";
pub const QUESTION_PLACEHOLDER: &str = "{user_question}";
pub const HISTORY_PLACEHOLDER: &str = "{historical_messages}";

/// Substituted for `{historical_messages}` when there is no prior exchange.
pub const NO_HISTORY_FALLBACK: &str = "No historical messages";

/// Returned in place of a summary prompt when there is nothing to summarize.
/// Callers must treat it as "nothing to summarize", not as an error.
pub const NO_HISTORY_TO_SUMMARIZE: &str = "No historical messages to summarize.";

/// Renders the turn template for one exchange.
///
/// Only the last history entry is substituted; earlier turns are dropped to keep the
/// prompt within the model's input budget. Inserted text is not escaped.
///
/// # Errors
///
/// [`PromptError::TemplateUnreadable`] if the turn template cannot be loaded.
pub fn construct_turn_prompt<H>(
    loader: &dyn TemplateLoader,
    persona_name: &str,
    user_question: &str,
    history: &[H],
) -> Result<String, PromptError>
where
    H: AsRef<str>,
{
    let template = loader.load(TemplateKind::Turn)?;
    let last_message = history
        .last()
        .map(|entry| entry.as_ref())
        .unwrap_or(NO_HISTORY_FALLBACK);

    Ok(template
        .replace(PERSONA_PLACEHOLDER, persona_name)
        .replace(QUESTION_PLACEHOLDER, user_question)
        .replace(HISTORY_PLACEHOLDER, last_message))
}

/// Renders the summary template over the whole history, newline-joined.
///
/// Empty history short-circuits to [`NO_HISTORY_TO_SUMMARIZE`] without loading the template.
pub fn construct_summary_prompt<H>(
    loader: &dyn TemplateLoader,
    history: &[H],
) -> Result<String, PromptError>
where
    H: AsRef<str>,
{
    if history.is_empty() {
        return Ok(NO_HISTORY_TO_SUMMARIZE.to_string());
    }

    let joined = history
        .iter()
        .map(|entry| entry.as_ref())
        .collect::<Vec<_>>()
        .join("\n");
    let template = loader.load(TemplateKind::Summary)?;
    Ok(template.replace(HISTORY_PLACEHOLDER, &joined))
}
