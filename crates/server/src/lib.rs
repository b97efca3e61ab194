//! Titlecard Server
//!
//! HTTP boundary for the title-card pipeline:
//! - `POST /addStaticTextFrame?fileUrl=..&text=..&durationSeconds=..`
//!   returns the source video with the card appended (`video/mp4`)
//! - `GET /health` reports whether the compose backend can run
//!
//! Failures are answered with `{"detail": "..."}` and a status picked per
//! error kind (see [`error::status_for`]).

pub mod error;
pub mod fetch;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use titlecard_common::config::AppConfig;
use titlecard_common::error::{TitlecardError, TitlecardResult};
use titlecard_render_engine::ComposeBackend;

pub use error::ApiError;
pub use routes::build_router;
pub use state::{AppState, DurationLimits};

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: &AppConfig, backend: Arc<dyn ComposeBackend>) -> TitlecardResult<()> {
    let addr: SocketAddr = config.server.bind_address.parse().map_err(|e| {
        TitlecardError::config(format!(
            "Invalid bind address {}: {e}",
            config.server.bind_address
        ))
    })?;

    if !backend.is_available() {
        tracing::warn!(
            backend = backend.name(),
            "Compose backend is not available; requests will fail until it is installed"
        );
    }

    let state = AppState::new(backend, &config.render)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "titlecard server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
