#![deny(warnings, clippy::all, clippy::pedantic, clippy::nursery)]

use std::{sync::Arc, time::Duration};

use clap::Parser;
use tokio::net::TcpListener;

use snapcook::{
    build_app,
    config::{Cli, Config},
    db::make_pool,
    llm::{GeminiClient, RecipeGenerator},
    logging::init_logging,
    models::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real environment variables still apply.
    dotenv::dotenv().ok();
    let config = Cli::parse().config;

    // Keep guard alive so file logger flushes correctly
    let _log_guards = init_logging(&config);

    log_config(&config);

    let generator = make_generator(&config);
    let pool = make_pool(&config.database_url).await?;

    let state = AppState {
        pool,
        generator,
        config: config.clone(),
    };

    let app = build_app(state);

    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn make_generator(config: &Config) -> RecipeGenerator {
    let Some(key) = config.api_key() else {
        tracing::error!("GOOGLE_API_KEY not set: recipe generation will fail until it is configured");
        return RecipeGenerator::unconfigured();
    };
    let client = GeminiClient::new(
        config.gemini_api_url.clone(),
        key.to_string(),
        config.model.clone(),
        Duration::from_secs(config.model_timeout_secs),
    );
    RecipeGenerator::new(Arc::new(client))
}

fn log_config(config: &Config) {
    tracing::info!("=== Configuration ===");
    tracing::info!("Bind address: {}", config.bind);
    tracing::info!("Database: {}", config.database_url);
    tracing::info!("Log file: {}", config.log_file.display());
    tracing::info!(
        "CORS origin: {}",
        config.cors_origin.as_deref().unwrap_or("<allow all>")
    );
    tracing::info!(
        "Google API key: {}",
        if config.api_key().is_some() {
            "<set>"
        } else {
            "<not set>"
        }
    );
    tracing::info!("Model: {}", config.model);
    tracing::info!("Gemini API URL: {}", config.gemini_api_url);
    tracing::info!("Model timeout: {}s", config.model_timeout_secs);
    tracing::info!("Max upload: {} bytes", config.max_upload_bytes);
    tracing::info!("=====================");
}
