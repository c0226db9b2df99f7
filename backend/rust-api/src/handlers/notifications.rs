use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::{
    models::{notification::NotificationListResponse, User},
    services::{notification_service::NotificationService, AppState, PortalError},
};

/// GET /api/v1/notifications - Session user's notifications, newest first
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Json<NotificationListResponse> {
    let service = NotificationService::new(state.store.clone());
    Json(NotificationListResponse {
        unread: service.unread_count(&user.id),
        notifications: service.list_for_user(&user.id),
    })
}

/// POST /api/v1/notifications/{id}/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<StatusCode, PortalError> {
    let service = NotificationService::new(state.store.clone());
    service.mark_read(&user.id, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Json<serde_json::Value> {
    let service = NotificationService::new(state.store.clone());
    let updated = service.mark_all_read(&user.id);
    Json(json!({ "updated": updated }))
}

/// DELETE /api/v1/notifications/{id}
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<StatusCode, PortalError> {
    let service = NotificationService::new(state.store.clone());
    service.delete(&user.id, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/notifications
pub async fn clear_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Json<serde_json::Value> {
    let service = NotificationService::new(state.store.clone());
    let removed = service.clear_for_user(&user.id);
    Json(json!({ "removed": removed }))
}
