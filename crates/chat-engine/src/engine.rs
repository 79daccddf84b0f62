//! [`ChatEngine`]: prompt construction, history, and reply retrieval.

use std::future::Future;
use std::sync::Arc;

use async_stream::stream;
use futures::{Stream, StreamExt};
use llm_client::{CompletionRequest, LlmClient, DEFAULT_MODEL};
use prompt::{TemplateLoader, NO_HISTORY_TO_SUMMARIZE};
use tracing::{debug, error, info, instrument, warn};

use crate::aggregate::aggregate_stream;
use crate::history::{format_exchange, History};
use crate::retry::RetryPolicy;
use crate::Result;

/// The only fragment a stream yields after it gives up.
pub const STREAM_ERROR_SENTINEL: &str = "Error: Unable to process request.";

/// One conversation: history, model, template source, and the client that answers.
pub struct ChatEngine {
    llm: Arc<dyn LlmClient>,
    templates: Arc<dyn TemplateLoader>,
    model: String,
    retry: RetryPolicy,
    history: History,
}

impl ChatEngine {
    pub fn new(llm: Arc<dyn LlmClient>, templates: Arc<dyn TemplateLoader>) -> Self {
        Self {
            llm,
            templates,
            model: DEFAULT_MODEL.to_string(),
            retry: RetryPolicy::default(),
            history: History::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Appends one completed exchange. `answer` is trimmed before formatting.
    pub fn record_exchange(&mut self, question: &str, answer: &str) {
        self.history.push(format_exchange(question, answer.trim()));
    }

    /// Renders the turn template with the persona, the question and the last history entry.
    pub fn construct_turn_prompt(&self, persona_name: &str, user_question: &str) -> Result<String> {
        let prompt = prompt::construct_turn_prompt(
            self.templates.as_ref(),
            persona_name,
            user_question,
            self.history.entries(),
        )?;
        debug!(prompt = %prompt, "Constructed turn prompt");
        Ok(prompt)
    }

    /// Renders the summary template over the whole history, or returns
    /// [`NO_HISTORY_TO_SUMMARIZE`] when there is none.
    pub fn construct_summary_prompt(&self) -> Result<String> {
        Ok(prompt::construct_summary_prompt(
            self.templates.as_ref(),
            self.history.entries(),
        )?)
    }

    /// Single-shot completion with the engine's retry policy.
    pub async fn get_response(&self, prompt: &str) -> Result<String> {
        self.get_response_with(prompt, &self.retry).await
    }

    /// Single-shot completion. Returns the generated text unstripped.
    ///
    /// # Errors
    ///
    /// [`crate::ChatError::UpstreamRequest`] after `policy.max_retries + 1` failed attempts.
    #[instrument(skip(self, prompt, policy), fields(model = %self.model))]
    pub async fn get_response_with(&self, prompt: &str, policy: &RetryPolicy) -> Result<String> {
        let request = CompletionRequest::single_user(&self.model, prompt);
        let response = policy.run(|| self.llm.complete(&request)).await?;
        debug!(response = %response, "Response from LLM");
        Ok(response)
    }

    /// Streamed completion with the engine's retry policy.
    pub fn get_response_streaming(&self, prompt: &str) -> impl Stream<Item = String> + Send + 'static {
        self.get_response_streaming_with(prompt, &self.retry)
    }

    /// Streamed completion as a lazy sequence of text fragments (possibly empty strings).
    ///
    /// Nothing is sent until the stream is first polled; each call issues a fresh request.
    /// Failures opening the stream, or failing before any visible text arrived, are retried up
    /// to `policy.max_retries` times. Once retries are exhausted, or a failure happens after
    /// text was already yielded, the stream yields [`STREAM_ERROR_SENTINEL`] and ends.
    /// A clean end has no trailing marker.
    pub fn get_response_streaming_with(
        &self,
        prompt: &str,
        policy: &RetryPolicy,
    ) -> impl Stream<Item = String> + Send + 'static {
        let llm = Arc::clone(&self.llm);
        let request = CompletionRequest::single_user(&self.model, prompt);
        let policy = policy.clone();

        stream! {
            let total = policy.total_attempts();
            let mut attempt = 1;
            loop {
                let mut yielded_text = false;
                let failure = match llm.complete_stream(&request).await {
                    Ok(mut fragments) => {
                        info!(attempt, "Streaming response started");
                        let mut failure = None;
                        while let Some(item) = fragments.next().await {
                            match item {
                                Ok(fragment) => {
                                    debug!(fragment = %fragment, "Stream fragment");
                                    yielded_text |= !fragment.is_empty();
                                    yield fragment;
                                }
                                Err(e) => {
                                    failure = Some(e);
                                    break;
                                }
                            }
                        }
                        failure
                    }
                    Err(e) => Some(e),
                };

                let e = match failure {
                    Some(e) => e,
                    None => break,
                };

                if yielded_text {
                    error!(attempt, error = %e, "Stream failed after partial output");
                    yield STREAM_ERROR_SENTINEL.to_string();
                    break;
                }
                if attempt >= total {
                    error!(attempts = attempt, error = %e, "Streaming failed after all attempts");
                    yield STREAM_ERROR_SENTINEL.to_string();
                    break;
                }
                warn!(
                    attempt,
                    error = %e,
                    delay_ms = policy.retry_delay.as_millis() as u64,
                    "Streaming attempt failed, retrying"
                );
                tokio::time::sleep(policy.retry_delay).await;
                attempt += 1;
            }
        }
    }

    /// One non-streaming exchange: build the prompt, fetch the reply, record it.
    /// Returns the trimmed reply.
    #[instrument(skip(self, user_question))]
    pub async fn ask(&mut self, persona_name: &str, user_question: &str) -> Result<String> {
        let prompt = self.construct_turn_prompt(persona_name, user_question)?;
        let response = self.get_response(&prompt).await?.trim().to_string();
        self.record_exchange(user_question, &response);
        Ok(response)
    }

    /// One streaming exchange: every non-empty fragment goes to `forward` as it arrives, and the
    /// concatenated reply is recorded once, after the stream ends.
    #[instrument(skip(self, user_question, forward))]
    pub async fn ask_streaming<F, Fut>(
        &mut self,
        persona_name: &str,
        user_question: &str,
        forward: F,
    ) -> Result<String>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let prompt = self.construct_turn_prompt(persona_name, user_question)?;
        let fragments = self.get_response_streaming(&prompt);
        let response = aggregate_stream(fragments, forward).await?;
        self.record_exchange(user_question, &response);
        Ok(response.trim().to_string())
    }

    /// Summarizes the whole history. With no history, returns [`NO_HISTORY_TO_SUMMARIZE`]
    /// without calling the model. The summary is not recorded.
    pub async fn summarize(&self) -> Result<String> {
        if self.history.is_empty() {
            return Ok(NO_HISTORY_TO_SUMMARIZE.to_string());
        }
        let prompt = self.construct_summary_prompt()?;
        Ok(self.get_response(&prompt).await?.trim().to_string())
    }
}
