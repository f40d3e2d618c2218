use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct CreatePullBody {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

/// POST /api/pulls — create a pull request and draw its reviewers.
pub async fn create_pull(
    State(app): State<AppState>,
    Json(body): Json<CreatePullBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if body.pull_request_id.is_empty() {
        return Err(AppError::bad_request("pull_request_id is required"));
    }
    let pr = rota_core::assignment::create_pull_request(
        app.store.as_ref(),
        &body.pull_request_id,
        &body.pull_request_name,
        &body.author_id,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "pr": pr }))))
}

/// POST /api/pulls/:id/merge — mark a pull request merged (idempotent).
pub async fn merge_pull(
    State(app): State<AppState>,
    Path(pr_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let pr = app.store.merge_pull_request(&pr_id).await?;
    Ok(Json(serde_json::json!({ "pr": pr })))
}

#[derive(serde::Deserialize)]
pub struct ReassignBody {
    pub user_id: String,
}

/// POST /api/pulls/:id/reassign — swap one reviewer slot, replacing the
/// departing `user_id` with a randomly drawn teammate.
pub async fn reassign_pull(
    State(app): State<AppState>,
    Path(pr_id): Path<String>,
    Json(body): Json<ReassignBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (pr, replacement) =
        rota_core::reassignment::reassign_reviewer(app.store.as_ref(), &pr_id, &body.user_id)
            .await?;
    Ok(Json(serde_json::json!({
        "pr": pr,
        "replaced_by": replacement,
    })))
}
