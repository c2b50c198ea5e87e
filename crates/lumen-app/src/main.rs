mod attachments;
mod cli;
mod repl;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use lumen_ai::{GeminiClient, GeminiConfig, TurnDispatcher};
use lumen_common::{LumenError, Result};
use lumen_config::validation::validate_chat;
use lumen_config::LumenConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::repl::ChatLoop;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    // Load config before logging so the configured level can apply.
    // An unreadable or out-of-range file stops startup.
    let loaded = match args.config.as_deref() {
        Some(path) => lumen_config::load_config_from(std::path::Path::new(path)),
        None => lumen_config::load_config(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("lumen: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log_directive = args
        .log_directive()
        .unwrap_or_else(|| config.logging.level.directive().to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::INFO.into()),
            ),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "lumen exited with an error");
            eprintln!("lumen: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &cli::Args, config: LumenConfig) -> Result<()> {
    let mut chat = config.chat;
    args.apply(&mut chat);
    validate_chat(&chat)?;

    let api_key = config.provider.api_key().ok_or_else(|| {
        LumenError::Other(format!(
            "no API key found, set {} in the environment",
            config.provider.api_key_env
        ))
    })?;

    let gemini = GeminiConfig::new(api_key)
        .with_base_url(config.provider.base_url.clone())
        .with_connect_timeout(Duration::from_secs(config.provider.connect_timeout_secs))
        .with_request_timeout(Duration::from_secs(config.provider.request_timeout_secs));
    let client = GeminiClient::new(gemini).map_err(|e| LumenError::Ai(e.to_string()))?;

    let dispatcher = TurnDispatcher::new(Arc::new(client), chat)
        .map_err(|e| LumenError::Ai(e.to_string()))?
        .with_image_model(config.provider.image_model);
    info!(
        model = %dispatcher.sessions().config().model_id,
        image_model = %dispatcher.image_model(),
        "Lumen starting"
    );

    ChatLoop::new(dispatcher).run().await?;
    Ok(())
}
