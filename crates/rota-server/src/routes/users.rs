use axum::extract::{Path, State};
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct SetActiveBody {
    pub is_active: bool,
}

/// POST /api/users/:id/active — flip one user's active flag.
pub async fn set_active(
    State(app): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<SetActiveBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    app.store.set_active(&user_id, body.is_active).await?;
    let user = app.store.get_user(&user_id).await?;
    Ok(Json(serde_json::json!({ "user": user })))
}

/// GET /api/users/:id/reviews — pull requests the user reviews.
pub async fn get_reviews(
    State(app): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    // Distinguish an unknown user from one with no assignments.
    app.store.get_user(&user_id).await?;
    let pulls = app.store.reviews_by_user(&user_id).await?;
    Ok(Json(serde_json::json!({
        "user_id": user_id,
        "pull_requests": pulls,
    })))
}
