use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    extractors::AppJson,
    models::{
        project::{
            AddCommentRequest, CreateProjectRequest, ListProjectsQuery, ProjectDetails,
            RateProjectRequest,
        },
        User,
    },
    services::{project_service::ProjectService, AppState, PortalError},
};

/// GET /api/v1/projects?ownerId=...
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListProjectsQuery>,
) -> Json<Vec<ProjectDetails>> {
    let service = ProjectService::new(state.store.clone());
    let projects = service.list_projects(query.owner_id.as_deref());
    Json(projects.into_iter().map(ProjectDetails::from).collect())
}

/// GET /api/v1/projects/{id}
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProjectDetails>, PortalError> {
    let service = ProjectService::new(state.store.clone());
    service
        .get_project(&id)
        .map(|p| Json(ProjectDetails::from(p)))
        .ok_or_else(|| PortalError::not_found("project", id))
}

/// POST /api/v1/projects
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    AppJson(req): AppJson<CreateProjectRequest>,
) -> Result<impl IntoResponse, PortalError> {
    req.validate()?;

    let service = ProjectService::new(state.store.clone());
    let project = service.create_project(&user, req)?;
    Ok((StatusCode::CREATED, Json(ProjectDetails::from(project))))
}

/// DELETE /api/v1/projects/{id} - Owner or enseignant only
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<StatusCode, PortalError> {
    let service = ProjectService::new(state.store.clone());
    let project = service
        .get_project(&id)
        .ok_or_else(|| PortalError::not_found("project", id.clone()))?;

    if project.owner_id != user.id && !user.is_enseignant() {
        return Err(PortalError::Forbidden(
            "only the owner or an enseignant can delete a project",
        ));
    }

    service.delete_project(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/{id}/comments
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    AppJson(req): AppJson<AddCommentRequest>,
) -> Result<impl IntoResponse, PortalError> {
    let service = ProjectService::new(state.store.clone());
    let comment = service.add_comment(&user, &id, &req.text)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PUT /api/v1/projects/{id}/rating
pub async fn rate_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    AppJson(req): AppJson<RateProjectRequest>,
) -> Result<Json<ProjectDetails>, PortalError> {
    let service = ProjectService::new(state.store.clone());
    let project = service.rate_project(&user, &id, req.value)?;
    Ok(Json(ProjectDetails::from(project)))
}
