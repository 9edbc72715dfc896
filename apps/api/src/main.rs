use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use radreport_api::config::Config;
use radreport_api::llm_client::OllamaClient;
use radreport_api::report::clock::SystemClock;
use radreport_api::routes::build_router;
use radreport_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting RadReport API v{}", env!("CARGO_PKG_VERSION"));

    let model = OllamaClient::new(
        config.ollama_url.clone(),
        config.model_name.clone(),
        Duration::from_secs(config.model_timeout_secs),
    )
    .context("Failed to build model HTTP client")?;
    info!(
        "Model backend initialized (url: {}, model: {})",
        config.ollama_url, config.model_name
    );

    let state = AppState {
        config: config.clone(),
        model: Arc::new(model),
        clock: Arc::new(SystemClock),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
