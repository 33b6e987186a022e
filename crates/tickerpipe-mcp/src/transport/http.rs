use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tickerpipe_core::ServerStatus;
use tower_http::trace::TraceLayer;

use crate::error::ServerError;
use crate::server::McpServer;

/// `POST /mcp` for JSON-RPC messages, `GET /health` for server status. The
/// status check never queues on the rate limiter, so polling `/health` cannot
/// hold up downloads.
pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handle_rpc))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

async fn handle_rpc(State(server): State<Arc<McpServer>>, body: String) -> Response {
    match server.handle_message(&body).await {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn health(State(server): State<Arc<McpServer>>) -> Json<ServerStatus> {
    Json(server.pipeline().server_status().await)
}

pub async fn serve_http(server: Arc<McpServer>, addr: SocketAddr) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    tracing::info!(%addr, "serving MCP over http");
    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
