use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::models::User;
use crate::services::AppState;

/// Requires a session user and hands it to the handler as `Extension<User>`.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(user) = state.store.current_user() else {
        tracing::debug!("Rejected {}: no session user", request.uri().path());
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Runs after `session_middleware`; only teachers get through.
pub async fn enseignant_guard_middleware(
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user = request.extensions().get::<User>();
    if let Some(user) = user {
        if user.is_enseignant() {
            return Ok(next.run(request).await);
        }
    }
    tracing::warn!("Access denied: enseignant role required");
    Err(StatusCode::FORBIDDEN)
}
