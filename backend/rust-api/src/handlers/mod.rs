use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::metrics;
use crate::services::AppState;
use crate::storage::LoadOutcome;

/// Reports the storage keys that fell back to their defaults at startup.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut keys = serde_json::Map::new();
    let mut degraded = false;

    for (key, outcome) in state.store.load_report() {
        let status = match outcome {
            LoadOutcome::Restored => "restored",
            LoadOutcome::Missing => "missing",
            LoadOutcome::Fallback { .. } => {
                degraded = true;
                "fallback"
            }
        };
        keys.insert(key.to_string(), json!(status));
    }

    Json(json!({
        "status": if degraded { "degraded" } else { "healthy" },
        "service": "pole-digital-api",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": {
            "backend": format!("{:?}", state.config.storage_backend).to_lowercase(),
            "keys": keys
        }
    }))
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}

pub mod auth;
pub mod contact;
pub mod notifications;
pub mod projects;
pub mod quizzes;
pub mod tasks;
pub mod teams;
pub mod users;
