//! # relay
//!
//! Entry-point glue: builds one [`ChatEngine`] from env config and drives it, either as an
//! interactive chat over stdin or as a single question. The engine does the work; this crate
//! only validates input, prints replies, and reports failures.

pub mod cli;

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use chat_engine::{ChatEngine, EngineConfig};
use llm_client::{LlmConfig, OpenAILlmClient};
use prompt::FileTemplateLoader;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info};

pub use cli::{validate_request, Cli, Commands};

pub const QUIT_COMMAND: &str = "/quit";
pub const SUMMARY_COMMAND: &str = "/summary";

/// Builds the engine: OpenAI client, template dir, model and retry policy from config.
pub fn build_engine(llm_cfg: &dyn LlmConfig, engine_cfg: &EngineConfig) -> ChatEngine {
    let llm = Arc::new(OpenAILlmClient::with_base_url(
        llm_cfg.api_key().to_string(),
        llm_cfg.base_url().to_string(),
    ));
    let templates = Arc::new(FileTemplateLoader::new(engine_cfg.prompt_dir.clone()));
    info!(
        model = %llm_cfg.model(),
        base_url = %llm_cfg.base_url(),
        prompt_dir = %engine_cfg.prompt_dir.display(),
        "Chat engine ready"
    );

    ChatEngine::new(llm, templates)
        .with_model(llm_cfg.model())
        .with_retry_policy(engine_cfg.retry.clone())
}

/// Runs one exchange and writes the reply to `out`.
///
/// When streaming, each fragment is written and flushed as it arrives; the reply is recorded
/// into history only after the stream ends.
pub async fn exchange<W: Write>(
    engine: &mut ChatEngine,
    persona_name: &str,
    user_question: &str,
    streaming: bool,
    out: &mut W,
) -> Result<String> {
    validate_request(persona_name, user_question)?;

    let reply = if streaming {
        let reply = engine
            .ask_streaming(persona_name, user_question, |fragment| {
                let written = write!(out, "{}", fragment).and_then(|_| out.flush());
                async move { written.map_err(anyhow::Error::from) }
            })
            .await?;
        writeln!(out)?;
        reply
    } else {
        let reply = engine.ask(persona_name, user_question).await?;
        writeln!(out, "{}", reply)?;
        reply
    };
    Ok(reply)
}

/// Interactive loop: one line per question until EOF or `/quit`.
///
/// A failed exchange is reported on `out` and the loop continues; history is unchanged by it.
pub async fn run_chat<R, W>(
    engine: &mut ChatEngine,
    persona_name: &str,
    streaming: bool,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if persona_name.trim().is_empty() {
        anyhow::bail!("Missing required field: persona_name");
    }
    let mut lines = input.lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        match question {
            "" => continue,
            QUIT_COMMAND => break,
            SUMMARY_COMMAND => match engine.summarize().await {
                Ok(summary) => writeln!(out, "{}", summary)?,
                Err(e) => {
                    error!(error = %e, "Summary failed");
                    writeln!(out, "Failed to get summary: {}", e)?;
                }
            },
            _ => {
                if let Err(e) = exchange(engine, persona_name, question, streaming, out).await {
                    error!(error = %e, "Exchange failed");
                    writeln!(out, "Failed to get response: {}", e)?;
                }
            }
        }
    }

    info!(turns = engine.history().len(), "Chat ended");
    Ok(())
}
