//! `GET /health`

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;
use tracing::warn;

use crate::AppState;

/// Reports `ok` when the database answers, 503 otherwise. No actor needed.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let database = state.db.health_check().await;
    let status = if database {
        StatusCode::OK
    } else {
        warn!("Health check failed: database unreachable");
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = json!({
        "status": database,
        "data": {
            "database": if database { "ok" } else { "unavailable" },
            "server_time": Utc::now().to_rfc3339(),
        }
    });

    (status, Json(body)).into_response()
}
