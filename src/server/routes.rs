//! Routes: request dispatch plus a health probe.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::node::{Node, NodeError};

#[derive(Clone)]
pub struct AppState {
    pub node: Arc<Node>,
}

pub fn create_router(node: Arc<Node>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/*path", post(dispatch_request))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { node })
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({"status": "ok", "service": state.node.app()}))
}

async fn dispatch_request(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let path = format!("/{}", path.trim_start_matches('/'));
    match state.node.handle(&path, body).await {
        // Business errors ride back as an error-shaped response body.
        Ok(response) if response.get("error").is_some() => {
            (StatusCode::BAD_REQUEST, Json(response))
        }
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(error @ NodeError::BadRequest) => {
            (StatusCode::BAD_REQUEST, Json(json!({"error": error.to_string()})))
        }
        Err(error @ NodeError::NoResponder { .. }) => {
            (StatusCode::BAD_GATEWAY, Json(json!({"error": error.to_string()})))
        }
        Err(error) => {
            tracing::error!(%error, "dispatch failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": error.to_string()})))
        }
    }
}
