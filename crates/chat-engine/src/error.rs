use prompt::PromptError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    /// Template missing or unreadable. Fatal, never retried.
    #[error("Configuration error: {0}")]
    Configuration(#[from] PromptError),

    /// Completion API still failing after every attempt (non-streaming path only).
    #[error("Upstream request failed after {attempts} attempts: {source}")]
    UpstreamRequest {
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },

    /// The caller's forward callback rejected a stream fragment.
    #[error("Failed to forward stream fragment: {0}")]
    Forward(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ChatError>;
