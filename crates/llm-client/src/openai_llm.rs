//! [`LlmClient`] backed by openai-client.

use anyhow::Result;
use async_trait::async_trait;
use openai_client::SamplingParams;
use tracing::instrument;

use super::{user_message, CompletionRequest, LlmClient, TextStream};

/// [`LlmClient`] implementation over the OpenAI Chat Completions API.
#[derive(Clone)]
pub struct OpenAILlmClient {
    client: openai_client::OpenAIClient,
}

impl OpenAILlmClient {
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: openai_client::OpenAIClient::with_base_url(api_key, base_url),
        }
    }

    fn to_openai(
        request: &CompletionRequest,
    ) -> Result<(Vec<openai_client::ChatCompletionRequestMessage>, SamplingParams)> {
        let messages = vec![user_message(&request.prompt)?];
        let params = SamplingParams {
            temperature: request.temperature,
            frequency_penalty: request.frequency_penalty,
            presence_penalty: request.presence_penalty,
        };
        Ok((messages, params))
    }
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let (messages, params) = Self::to_openai(request)?;
        self.client
            .chat_completion(&request.model, messages, params)
            .await
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete_stream(&self, request: &CompletionRequest) -> Result<TextStream> {
        let (messages, params) = Self::to_openai(request)?;
        self.client
            .chat_completion_stream(&request.model, messages, params)
            .await
    }
}
