use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/stats — per-user reviewer/authored counts.
pub async fn get_stats(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let stats = app.store.user_stats().await?;
    Ok(Json(serde_json::json!({ "statistics": stats })))
}
