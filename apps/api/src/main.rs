mod config;
mod errors;
mod interview;
mod llm_client;
mod routes;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::autosave::AutoSaver;
use crate::session::store::{RedisStore, SessionStore};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Podium API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Redis-backed session storage
    let redis = redis::Client::open(config.redis_url.clone())?;
    let store: Arc<dyn SessionStore> = Arc::new(RedisStore::new(redis));
    info!("Redis session store initialized");

    // Persistence coordinator — owns the auto-save timer
    let autosaver = Arc::new(AutoSaver::new(
        Arc::clone(&store),
        Duration::from_secs(config.autosave_interval_secs),
    ));

    // Crash recovery: resume the pointer-indicated session, if any
    match autosaver.restore_current().await {
        Ok(Some(session)) => info!("resumed in-progress session {}", session.id),
        Ok(None) => info!("no session to resume"),
        Err(e) => tracing::warn!("could not check for a resumable session: {e}"),
    }

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Build app state
    let state = AppState {
        store,
        autosaver: Arc::clone(&autosaver),
        llm,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Deterministic teardown: final save, then release the timer.
    autosaver.cleanup().await;
    info!("shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
    }
}
