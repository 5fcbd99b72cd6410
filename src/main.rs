use anyhow::{Context, Result};
use clap::Parser;
use insight_chat::{
    api::{ChatBackend, HttpBackend},
    app,
    config::{self, validate_config, ConfigOverrides},
    constants::SERVER_URL_ENV,
    dispatcher::Dispatcher,
    logging::init_logging,
};
use log::info;
use std::{path::PathBuf, sync::Arc};

/// Terminal chat widget for the Reddit insights assistant.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Base URL of the chat server.
    #[arg(long, env = SERVER_URL_ENV)]
    server_url: Option<String>,

    /// Path of the chat endpoint on the server.
    #[arg(long)]
    endpoint: Option<String>,

    /// Config file to use instead of ~/.config/insight-chat/config.json.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with the widget closed.
    #[arg(long)]
    closed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config =
        config::load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_overrides(ConfigOverrides {
        server_url: cli.server_url,
        endpoint: cli.endpoint,
        closed: cli.closed,
    });
    validate_config(&config).context("Invalid configuration")?;

    let log_dir = match &cli.config {
        Some(path) => path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
        None => config::app_dir()?,
    };
    let _logger = init_logging(&log_dir, &config.log_level)?;
    info!("Talking to {}", config.chat_url());

    let backend: Arc<dyn ChatBackend> = Arc::new(HttpBackend::from_config(&config));
    let (dispatcher, replies) = Dispatcher::new(backend);
    app::run(&config, dispatcher, replies).await?;

    Ok(())
}
