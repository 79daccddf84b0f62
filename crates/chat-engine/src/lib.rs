//! # chat-engine
//!
//! The conversational relay core: a [`ChatEngine`] owns a rolling [`History`], renders prompts
//! from the turn/summary templates, and fetches replies from an [`llm_client::LlmClient`]
//! with bounded retry, either in one piece or as a stream of text fragments.
//!
//! ## Failure policy
//!
//! - Non-streaming: exhausted retries surface as [`ChatError::UpstreamRequest`].
//! - Streaming: exhausted retries yield a single [`STREAM_ERROR_SENTINEL`] fragment instead of
//!   an error, so the fragment sequence is always plain text.
//!
//! ## Concurrency
//!
//! The engine holds no locks. Appends go through `&mut self`; callers sharing one engine must
//! serialize them. Separate engines share nothing.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod logger;
pub mod retry;

pub use aggregate::aggregate_stream;
pub use config::EngineConfig;
pub use engine::{ChatEngine, STREAM_ERROR_SENTINEL};
pub use error::{ChatError, Result};
pub use history::{format_exchange, History};
pub use logger::init_tracing;
pub use retry::RetryPolicy;
