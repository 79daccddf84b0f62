//! # Prompt
//!
//! Builds the single prompt string sent to the model for each exchange.
//!
//! ## Templates
//!
//! - **Turn** (`prompt.txt`): placeholders `{persona_name}`, `{user_question}`, `{historical_messages}`.
//! - **Summary** (`summary_prompt.txt`): placeholder `{historical_messages}`.
//!
//! Substitution is literal find/replace; there is no escaping syntax, so braces in user text
//! pass through untouched.
//!
//! ## External interactions
//!
//! - **Filesystem**: [`FileTemplateLoader`] reads the template files on every render.
//! - **AI models**: the rendered prompt is sent to the LLM API as the single user message.

mod builder;
mod error;
mod loader;

pub use builder::{
    construct_summary_prompt, construct_turn_prompt, HISTORY_PLACEHOLDER, NO_HISTORY_FALLBACK,
    NO_HISTORY_TO_SUMMARIZE, PERSONA_PLACEHOLDER, QUESTION_PLACEHOLDER,
};
pub use error::PromptError;
pub use loader::{
    FileTemplateLoader, StaticTemplateLoader, TemplateKind, TemplateLoader, DEFAULT_PROMPT_DIR,
};
