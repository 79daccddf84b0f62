//! # OpenAI API client
//!
//! Thin wrapper around [async-openai] for chat completion (non-stream and stream).
//! Provides token masking for safe logging and a simple request/response API.

use async_openai::{types::CreateChatCompletionRequestArgs, Client};
use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::Arc;
use tracing::instrument;

pub use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
};

/// Incremental text deltas of a streamed completion. A chunk without content yields `""`.
pub type DeltaStream = BoxStream<'static, anyhow::Result<String>>;

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 || !token.is_char_boundary(7) || !token.is_char_boundary(len - 4) {
        "***".to_string()
    } else {
        format!("{}***{}", &token[..7], &token[len - 4..])
    }
}

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

/// OpenAI chat client. Wraps async-openai client; keeps the API key for masked logging.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Arc<Client<async_openai::config::OpenAIConfig>>,
    /// API key stored only for logging (masked).
    api_key: String,
}

impl OpenAIClient {
    /// Builds a client using the given API key and default API base URL.
    pub fn new(api_key: String) -> Self {
        let config = async_openai::config::OpenAIConfig::new().with_api_key(api_key.clone());
        Self {
            client: Arc::new(Client::with_config(config)),
            api_key,
        }
    }

    /// Builds a client with a custom base URL (e.g. for proxies or compatible endpoints).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let config = async_openai::config::OpenAIConfig::new()
            .with_api_key(api_key.clone())
            .with_api_base(base_url);
        Self {
            client: Arc::new(Client::with_config(config)),
            api_key,
        }
    }

    fn masked_key(&self) -> String {
        mask_token(&self.api_key)
    }

    /// Sends a chat completion request and returns the first choice's content, unstripped.
    ///
    /// Logs masked API key, request JSON, and token usage. A response with no choices is an error;
    /// a choice with no content yields an empty string.
    #[instrument(skip(self, messages), fields(message_count = messages.len()))]
    pub async fn chat_completion(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
        params: SamplingParams,
    ) -> anyhow::Result<String> {
        tracing::info!(model = %model, api_key = %self.masked_key(), "OpenAI chat_completion request");

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .temperature(params.temperature)
            .frequency_penalty(params.frequency_penalty)
            .presence_penalty(params.presence_penalty)
            .build()?;

        if let Ok(json) = serde_json::to_string(&request) {
            tracing::debug!(request_json = %json, "OpenAI chat_completion request JSON");
        }

        let response = self.client.chat().create(request).await?;

        if let Some(ref u) = response.usage {
            tracing::info!(
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                "OpenAI chat_completion usage"
            );
        }

        match response.choices.first() {
            Some(choice) => Ok(choice.message.content.clone().unwrap_or_default()),
            None => anyhow::bail!("No response from OpenAI"),
        }
    }

    /// Opens a streamed chat completion and returns its text deltas as they arrive.
    ///
    /// Connection and request errors are returned here; errors reported by the server mid-stream
    /// are items of the returned stream. Nothing is buffered: each network chunk maps to one item.
    #[instrument(skip(self, messages), fields(message_count = messages.len()))]
    pub async fn chat_completion_stream(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
        params: SamplingParams,
    ) -> anyhow::Result<DeltaStream> {
        tracing::info!(model = %model, api_key = %self.masked_key(), "OpenAI chat_completion_stream request");

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .temperature(params.temperature)
            .frequency_penalty(params.frequency_penalty)
            .presence_penalty(params.presence_penalty)
            .stream(true)
            .build()?;

        if let Ok(json) = serde_json::to_string(&request) {
            tracing::debug!(request_json = %json, "OpenAI chat_completion_stream request JSON");
        }

        let stream = self.client.chat().create_stream(request).await?;
        tracing::info!("Connected to OpenAI, streaming response started");

        Ok(stream
            .map(|result| {
                let chunk = result.map_err(|e| anyhow::anyhow!("Stream error: {}", e))?;
                if let Some(ref u) = chunk.usage {
                    tracing::info!(
                        prompt_tokens = u.prompt_tokens,
                        completion_tokens = u.completion_tokens,
                        total_tokens = u.total_tokens,
                        "OpenAI chat_completion_stream usage"
                    );
                }
                Ok(chunk
                    .choices
                    .first()
                    .and_then(|choice| choice.delta.content.clone())
                    .unwrap_or_default())
            })
            .boxed())
    }
}
