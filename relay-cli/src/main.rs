//! relay: loads `.env`, config and logging, then runs the chosen command.

use anyhow::Result;
use chat_engine::{init_tracing, EngineConfig};
use clap::Parser;
use llm_client::{EnvLlmConfig, LlmConfig};
use relay::{build_engine, exchange, run_chat, Cli, Commands};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let engine_cfg = EngineConfig::from_env();
    init_tracing(&engine_cfg.log_file)?;
    let llm_cfg = EnvLlmConfig::from_env()?;
    let mut engine = build_engine(&llm_cfg, &engine_cfg);
    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::Chat { persona, stream } => {
            let streaming = stream || llm_cfg.use_streaming();
            let input = BufReader::new(tokio::io::stdin());
            run_chat(&mut engine, &persona, streaming, input, &mut stdout).await
        }
        Commands::Ask {
            persona,
            stream,
            question,
        } => {
            let streaming = stream || llm_cfg.use_streaming();
            exchange(&mut engine, &persona, &question, streaming, &mut stdout)
                .await
                .map(|_| ())
        }
    }
}
