use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use std::sync::Arc;

use crate::{
    extractors::AppJson,
    models::{team::CreateTeamRequest, Team, User},
    services::{team_service::TeamService, AppState, PortalError},
};

/// GET /api/v1/teams - Teams the session user belongs to
pub async fn list_teams(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Json<Vec<Team>> {
    let service = TeamService::new(state.store.clone());
    Json(service.teams_for_user(&user.id))
}

/// POST /api/v1/teams
pub async fn create_team(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    AppJson(req): AppJson<CreateTeamRequest>,
) -> Result<impl IntoResponse, PortalError> {
    let service = TeamService::new(state.store.clone());
    let team = service.create_team(&user, &req.name, &req.description, req.members)?;
    Ok((StatusCode::CREATED, Json(team)))
}
