pub mod pulls;
pub mod stats;
pub mod teams;
pub mod users;

use axum::Json;

/// GET /health — liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
