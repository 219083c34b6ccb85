//! Liveness Endpoint
//!
//! `GET /health` answers 200 while the process is up. It does not reflect
//! reconciliation results; sync failures are retried, not surfaced here.

use axum::{routing::get, Json, Router};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

pub fn router() -> Router {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "mc-router-sync",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Serve the health endpoint on `listener` until `shutdown` turns true
/// (or its sender is dropped).
pub async fn serve(listener: TcpListener, mut shutdown: watch::Receiver<bool>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "Health server listening");
    }

    axum::serve(listener, router())
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|cancelled| *cancelled).await;
            info!("Shutting down health server");
        })
        .await
}
