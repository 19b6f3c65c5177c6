mod config;
mod db;
mod errors;
mod llm_client;
mod loader;
mod models;
mod normalize;
mod outreach;
mod portfolio;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::loader::PageLoader;
use crate::portfolio::embedding::create_embedder;
use crate::portfolio::store::PortfolioStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cold Mail Generator v{}", env!("CARGO_PKG_VERSION"));

    let timeout = config.http_timeout_secs.map(Duration::from_secs);

    // Initialize portfolio store (reads the source table, opens the index)
    let embedder = create_embedder(&config.embedding, timeout)?;
    info!("Embedding model: {}", embedder.model_name());
    let store = Arc::new(PortfolioStore::open(&config.portfolio, embedder).await?);
    info!(
        "Portfolio collection '{}' holds {} entries",
        store.collection(),
        store.count().await?
    );

    // Initialize LLM client
    let llm = LlmClient::new(config.groq_api_key.clone(), config.llm_model.clone(), timeout)?;
    info!("LLM client initialized (model: {})", llm.model());

    let loader = PageLoader::new(&config.user_agent, timeout)?;

    let port = config.port;
    let state = AppState {
        loader,
        store: store.clone(),
        llm: Arc::new(llm),
        config: Arc::new(config),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
