use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::{
    models::user::{LeaderboardQuery, UserProfile},
    services::{leaderboard_service::LeaderboardService, AppState, PortalError},
};

/// GET /api/v1/users
pub async fn list_users(State(state): State<Arc<AppState>>) -> Json<Vec<UserProfile>> {
    let users = state.store.users().get();
    Json(users.into_iter().map(UserProfile::from).collect())
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>, PortalError> {
    state
        .store
        .find_user(&id)
        .map(|user| Json(UserProfile::from(user)))
        .ok_or_else(|| PortalError::not_found("user", id))
}

/// GET /api/v1/leaderboard?filiere=DEV&search=...
pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Json<Vec<UserProfile>> {
    let service = LeaderboardService::new(state.store.clone());
    Json(service.leaderboard(query.filiere.as_deref(), query.search.as_deref()))
}
