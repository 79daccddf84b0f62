//! CLI parser and request validation.

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "Persona chat relay over an OpenAI-compatible API", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive conversation on stdin. `/summary` summarizes so far, `/quit` exits.
    Chat {
        /// Persona the model plays.
        #[arg(short, long)]
        persona: String,
        /// Stream the reply as it is generated (overrides USE_STREAMING).
        #[arg(short, long)]
        stream: bool,
    },
    /// Ask a single question and print the reply.
    Ask {
        #[arg(short, long)]
        persona: String,
        #[arg(short, long)]
        stream: bool,
        question: String,
    },
}

/// Rejects blank persona or question before any prompt is built.
pub fn validate_request(persona_name: &str, user_question: &str) -> Result<()> {
    if persona_name.trim().is_empty() || user_question.trim().is_empty() {
        anyhow::bail!("Missing required fields: user_question or persona_name");
    }
    Ok(())
}
