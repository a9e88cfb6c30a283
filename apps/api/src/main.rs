mod client;
mod config;
mod errors;
mod form;
mod generation;
mod models;
mod routes;
mod state;
mod worker;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::generation::bridge::GenerationBridge;
use crate::routes::build_router;
use crate::state::AppState;
use crate::worker::ProcessLauncher;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on unparseable env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting docbridge v{}", env!("CARGO_PKG_VERSION"));

    // Worker launcher: one fresh process per request
    let mut launcher = ProcessLauncher::new(&config.worker_program, config.worker_args.clone());
    if let Some(dir) = &config.worker_dir {
        launcher = launcher.working_dir(dir);
    }
    info!("Worker command: {}", launcher.command_line());

    let limits = config.bridge_limits();
    info!(
        "Worker limits: {} concurrent, {}s timeout, {} byte artifacts",
        limits.max_concurrent_workers,
        limits.timeout.as_secs(),
        limits.max_artifact_bytes
    );

    // Build app state
    let state = AppState {
        bridge: GenerationBridge::new(Arc::new(launcher), limits),
    };

    let cors = build_cors(&config.allowed_origin)?;
    info!("CORS origin: {}", config.allowed_origin);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Allows exactly one browser origin; never a wildcard.
fn build_cors(origin: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("ALLOWED_ORIGIN '{origin}' is not a valid header value"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION]))
}
