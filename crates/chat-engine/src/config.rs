//! Engine config: template location, retry policy, log file. Loaded from env.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use prompt::DEFAULT_PROMPT_DIR;

use crate::retry::{RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};

pub const DEFAULT_LOG_FILE: &str = "logs/relay.log";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// PROMPT_DIR: directory holding prompt.txt and summary_prompt.txt
    pub prompt_dir: PathBuf,
    /// MAX_RETRIES and RETRY_DELAY_MS
    pub retry: RetryPolicy,
    /// LOG_FILE
    pub log_file: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            prompt_dir: PathBuf::from(DEFAULT_PROMPT_DIR),
            retry: RetryPolicy::default(),
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl EngineConfig {
    /// Load from environment variables; unset or unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        let prompt_dir = env::var("PROMPT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PROMPT_DIR));
        let max_retries = env::var("MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_RETRIES);
        let retry_delay = env::var("RETRY_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_RETRY_DELAY);
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());

        Self {
            prompt_dir,
            retry: RetryPolicy::new(max_retries, retry_delay),
            log_file,
        }
    }
}
