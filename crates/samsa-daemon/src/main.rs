//! samsa-daemon entry point.
//!
//! This file is intentionally thin: it sets up tracing, loads settings, builds
//! the shared state, wires middleware, and starts the HTTP server. All route
//! handlers live in `routes.rs`; all shared state types live in `state.rs`.

use std::sync::Arc;

use anyhow::Context;
use samsa_daemon::{routes, state};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let settings = samsa_config::load_settings_from_env().context("settings load failed")?;
    info!(
        orders_file = ?settings.orders.file,
        static_dir = ?settings.server.static_dir,
        telegram_api = %settings.telegram.api_base,
        "settings loaded"
    );

    let shared = Arc::new(state::AppState::from_settings(&settings)?);

    let app = routes::build_router(shared)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // The storefront may be hosted on another origin.
        .layer(CorsLayer::permissive());

    let addr = settings.server.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr} failed"))?;
    info!("samsa-daemon listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    info!("samsa-daemon stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "ctrl-c handler failed; shutting down");
    }
}
