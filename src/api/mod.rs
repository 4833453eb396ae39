//! HTTP API
//!
//! JSON endpoints over the company, document and report services.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

pub use error::ApiError;
pub use router::create_router;
pub use state::AppState;

/// Serve the API until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr, max_body_bytes: usize) -> Result<()> {
    let app = create_router(state, max_body_bytes);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutting down gracefully...");
}
