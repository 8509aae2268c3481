//! StockWise application binary - composition root.
//!
//! 1. Load `.env`, CLI flags and the TOML configuration
//! 2. Initialize tracing
//! 3. Build the response engine for the configured mode
//! 4. Serve the axum HTTP API until Ctrl+C

mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use stockwise_api::routes;
use stockwise_api::state::AppState;
use stockwise_chat::ResponseEngine;
use stockwise_core::StockwiseConfig;

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is normal.
    let dotenv = dotenvy::dotenv();
    let cli = CliArgs::parse();

    // Read the file before tracing is up so its log level can apply.
    let config_path = cli.resolve_config_path();
    let file_config = StockwiseConfig::load(&config_path);

    let level = cli
        .log_level
        .clone()
        .or_else(|| file_config.as_ref().ok().map(|c| c.general.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)),
        )
        .init();

    tracing::info!("Starting StockWise v{}", env!("CARGO_PKG_VERSION"));
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let mut config = match file_config {
        Ok(config) => {
            tracing::info!(path = %config_path.display(), "Configuration loaded");
            config
        }
        Err(e) => {
            tracing::warn!(
                path = %config_path.display(),
                error = %e,
                "Config file unavailable, using defaults"
            );
            StockwiseConfig::default()
        }
    };
    config.apply_env(|key| std::env::var(key).ok());
    cli.apply_overrides(&mut config);
    config.validate()?;

    let engine = ResponseEngine::from_config(&config)?;
    if config.engine.mode == stockwise_core::EngineMode::Generative {
        tracing::info!(
            endpoint = %config.generation.endpoint,
            model = %config.generation.model,
            "Replies will be generated upstream"
        );
    }

    let state = AppState::new(config.clone(), engine);
    routes::start_server(&config, state).await?;

    tracing::info!("StockWise shut down");
    Ok(())
}
