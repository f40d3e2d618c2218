use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use rota_core::types::{DeactivationReport, Team, TeamMember};

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct CreateTeamBody {
    pub team_name: String,
    pub members: Vec<MemberBody>,
}

#[derive(serde::Deserialize)]
pub struct MemberBody {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub is_active: bool,
}

/// POST /api/teams — submit a team roster.
///
/// Members are created or updated idempotently; the team name itself must
/// be new.
pub async fn create_team(
    State(app): State<AppState>,
    Json(body): Json<CreateTeamBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if body.team_name.is_empty() {
        return Err(AppError::bad_request("team_name is required"));
    }
    if body.members.is_empty() {
        return Err(AppError::bad_request("no members provided"));
    }
    if let Some(m) = body.members.iter().find(|m| m.user_id.is_empty()) {
        return Err(AppError::bad_request(format!(
            "member with empty user_id found: username={:?}",
            m.username
        )));
    }

    let team = Team {
        name: body.team_name,
        members: body
            .members
            .into_iter()
            .map(|m| TeamMember {
                id: m.user_id,
                username: m.username,
                active: m.is_active,
            })
            .collect(),
    };
    app.store.create_team(&team).await?;
    let created = app.store.get_team(&team.name).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "team": created })),
    ))
}

/// GET /api/teams/:name — team with its full roster.
pub async fn get_team(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Team>, AppError> {
    let team = app.store.get_team(&name).await?;
    Ok(Json(team))
}

#[derive(serde::Deserialize)]
pub struct DeactivateBody {
    #[serde(default)]
    pub user_ids: Vec<String>,
}

/// POST /api/teams/:name/deactivate — deactivate members and re-home
/// their open review load under the batch budget.
pub async fn deactivate_members(
    State(app): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<DeactivateBody>,
) -> Result<Json<DeactivationReport>, AppError> {
    let report =
        rota_core::deactivation::deactivate_users(app.store.as_ref(), &name, &body.user_ids)
            .await?;
    Ok(Json(report))
}
