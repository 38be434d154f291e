//! HTTP server lifecycle: bind, serve, shut down on ctrl-c.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

/// Bind and serve the API until interrupted.
pub async fn run(ctx: ApiContext, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    let local = listener.local_addr().context("failed to read bound address")?;
    tracing::info!(%local, "API server started");

    axum::serve(listener, api_router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown signal received");
    }
}
