use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    extractors::AppJson,
    models::{
        task::{CreateTaskRequest, ListTasksQuery},
        Task, User,
    },
    services::{task_service::TaskService, AppState, PortalError},
};

/// GET /api/v1/tasks?projectId=...
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTasksQuery>,
) -> Json<Vec<Task>> {
    let service = TaskService::new(state.store.clone());
    Json(service.list_tasks(query.project_id.as_deref()))
}

/// POST /api/v1/tasks
pub async fn add_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    AppJson(req): AppJson<CreateTaskRequest>,
) -> Result<impl IntoResponse, PortalError> {
    let service = TaskService::new(state.store.clone());
    let task = service.add_task(&user, &req.name, req.project_id)?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// POST /api/v1/tasks/{id}/toggle
pub async fn toggle_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, PortalError> {
    let service = TaskService::new(state.store.clone());
    service.toggle_task(&id).map(Json)
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, PortalError> {
    let service = TaskService::new(state.store.clone());
    service.delete_task(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
