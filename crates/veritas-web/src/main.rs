//! Veritas web server
//!
//! Run with: cargo run -p veritas-web --bin veritas

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;
use veritas_core::AnalysisService;
use veritas_llm::GeminiClassifierFactory;
use veritas_web::{config::Config, router::build_router, state::AppState};
use veritas_zeroshot::ZeroShotClassifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("veritas=debug,info")),
        )
        .init();

    info!("Veritas starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    info!(
        "Configuration loaded. Local model: {}, remote model: {}",
        config.local.model_id, config.remote.model
    );

    // Loaded once and shared by every request.
    let local = ZeroShotClassifier::load(config.local.clone())
        .await
        .context("Failed to load zero-shot model")?;
    let remote = GeminiClassifierFactory::new(config.remote.clone())
        .context("Failed to build Gemini client")?;

    let service = AnalysisService::new(Arc::new(local), Arc::new(remote));
    let state = AppState::new(service).context("Failed to load templates")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!("Server listening on http://{}", config.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Veritas stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
