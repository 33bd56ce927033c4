//! HTTP transport
//!
//! `POST /mcp` accepts one JSON-RPC message per request and answers with the
//! JSON-RPC response body. Notifications are acknowledged with `202 Accepted`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::error::{FinanceMcpError, McpError, Result};
use crate::mcp::server::McpServer;

/// Build the HTTP router for a shared server
pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handle_rpc))
        .route("/health", get(health))
        .with_state(server)
}

/// Bind `addr` and serve until the process is stopped
pub async fn run_http(server: Arc<McpServer>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        FinanceMcpError::Mcp(McpError::TransportError {
            message: format!("Failed to bind {}: {}", addr, e),
        })
    })?;

    tracing::info!("MCP server listening on http://{}/mcp", addr);

    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn handle_rpc(State(server): State<Arc<McpServer>>, body: String) -> Response {
    match server.handle_message(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn health() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "ok")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
