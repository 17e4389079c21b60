//! HTTP front end: every route body becomes the input of one
//! `Requesting.request` action.

mod routes;

pub use routes::create_router;

use crate::node::Node;
use crate::runtime::shutdown_signal;
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;

/// Serve the node until SIGINT/SIGTERM.
pub async fn serve(node: Arc<Node>, addr: SocketAddr) -> anyhow::Result<()> {
    let router = create_router(node);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}
