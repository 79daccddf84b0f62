//! Shared fakes for chat-engine tests: a scripted [`LlmClient`] and static templates.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chat_engine::ChatEngine;
use futures::StreamExt;
use llm_client::{CompletionRequest, LlmClient, TextStream};
use prompt::StaticTemplateLoader;

pub const TURN_TEMPLATE: &str =
    "Persona: {persona_name}\nHistory: {historical_messages}\nQuestion: {user_question}";
pub const SUMMARY_TEMPLATE: &str = "Summarize:\n{historical_messages}";

/// What one `complete_stream` call does.
pub enum StreamScript {
    /// The stream cannot be opened.
    OpenFails,
    /// The stream opens and yields these items; `Err` items are mid-stream failures.
    Items(Vec<Result<&'static str, &'static str>>),
}

/// LLM client that replays scripted outcomes in call order and records every request.
/// Once a script runs out, every further call fails.
#[derive(Default)]
pub struct FakeLlm {
    replies: Mutex<VecDeque<Result<&'static str, &'static str>>>,
    streams: Mutex<VecDeque<StreamScript>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: Vec<Result<&'static str, &'static str>>) -> Self {
        let llm = Self::default();
        *llm.replies.lock().unwrap() = replies.into();
        llm
    }

    pub fn with_streams(streams: Vec<StreamScript>) -> Self {
        let llm = Self::default();
        *llm.streams.lock().unwrap() = streams.into();
        llm
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text.to_string()),
            Some(Err(e)) => Err(anyhow::anyhow!(e)),
            None => Err(anyhow::anyhow!("service unavailable")),
        }
    }

    async fn complete_stream(&self, request: &CompletionRequest) -> anyhow::Result<TextStream> {
        self.requests.lock().unwrap().push(request.clone());
        match self.streams.lock().unwrap().pop_front() {
            Some(StreamScript::Items(items)) => Ok(futures::stream::iter(
                items
                    .into_iter()
                    .map(|item| item.map(String::from).map_err(|e| anyhow::anyhow!(e))),
            )
            .boxed()),
            Some(StreamScript::OpenFails) | None => Err(anyhow::anyhow!("connection refused")),
        }
    }
}

pub fn engine_with(llm: Arc<FakeLlm>) -> ChatEngine {
    ChatEngine::new(
        llm,
        Arc::new(StaticTemplateLoader::new(TURN_TEMPLATE, SUMMARY_TEMPLATE)),
    )
}
