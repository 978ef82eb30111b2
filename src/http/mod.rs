//! HTTP server for MCP over HTTP transport.
//!
//! Provides an alternative to stdio transport for web-based clients.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::mcp::protocol::*;
use crate::mcp::server::McpServer;

/// HTTP server state.
#[derive(Clone)]
pub struct HttpState {
    server: Arc<McpServer>,
}

/// Build the router without binding a socket.
pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/mcp", post(json_rpc))
        .route("/mcp/initialize", post(initialize))
        .route("/mcp/tools/list", get(list_tools))
        .route("/mcp/tools/call", post(call_tool))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(HttpState { server })
}

/// Start the HTTP server.
pub async fn start_server(config: &Config, server: Arc<McpServer>) -> Result<()> {
    let app = router(server);

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| Error::HttpServer(e.to_string()))?;

    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}

/// Full JSON-RPC endpoint sharing dispatch with stdio.
async fn json_rpc(
    State(state): State<HttpState>,
    Json(req): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    Json(state.server.handle_request(req).await)
}

/// The body is optional; an empty or non-JSON body negotiates the default version.
async fn initialize(State(state): State<HttpState>, body: Bytes) -> impl IntoResponse {
    let params = serde_json::from_slice::<serde_json::Value>(&body).ok();
    match state.server.handle_initialize(params) {
        Ok(value) => (StatusCode::OK, Json(value)),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

async fn list_tools(State(state): State<HttpState>) -> impl IntoResponse {
    let tools = state.server.handler().list_tools();
    Json(ListToolsResult { tools })
}

#[derive(Debug, Deserialize)]
struct CallToolRequest {
    name: String,
    #[serde(default)]
    arguments: HashMap<String, serde_json::Value>,
}

async fn call_tool(
    State(state): State<HttpState>,
    Json(req): Json<CallToolRequest>,
) -> impl IntoResponse {
    let handler = match state.server.handler().get_tool(&req.name) {
        Some(h) => h,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({
                    "error": format!("Tool not found: {}", req.name)
                })),
            );
        }
    };

    let outcome = handler
        .execute(req.arguments)
        .await
        .and_then(|result| serde_json::to_value(result).map_err(Error::from));

    match outcome {
        Ok(value) => (StatusCode::OK, Json(value)),
        Err(e @ Error::InvalidToolArguments(_)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}
