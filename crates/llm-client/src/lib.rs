//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] trait and an OpenAI implementation. The chat engine talks only to
//! the trait, so tests and other providers can stand in for OpenAI.
//!
//! Both methods take a [`CompletionRequest`]; the streaming method returns a pull-based
//! [`TextStream`] so the caller controls pacing.

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use openai_client::{ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs};

mod config;
mod openai_llm;

pub use config::{EnvLlmConfig, LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use openai_llm::OpenAILlmClient;

/// Fragments of a streamed reply, in arrival order. Empty strings are allowed.
pub type TextStream = BoxStream<'static, Result<String>>;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// One completion request: model, the prompt sent as the only user message, and sampling
/// parameters. Streaming is chosen by calling [`LlmClient::complete_stream`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl CompletionRequest {
    /// Single-message conversation: the prompt as user content, temperature 0.7, no penalties.
    pub fn single_user(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature: DEFAULT_TEMPERATURE,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

/// LLM client interface: single-shot completion or streamed completion.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the generated text of the first choice, unstripped.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Opens a streamed completion. `Err` means the stream could not be opened; errors after
    /// that arrive as stream items.
    async fn complete_stream(&self, request: &CompletionRequest) -> Result<TextStream>;
}

/// Wraps the prompt as the single user message of the conversation.
fn user_message(prompt: &str) -> Result<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestUserMessageArgs::default()
        .content(prompt)
        .build()?
        .into())
}
