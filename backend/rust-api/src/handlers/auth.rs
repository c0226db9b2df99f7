use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use std::sync::Arc;
use validator::Validate;

use crate::{
    extractors::AppJson,
    models::user::{LoginRequest, SignUpData, UpdateProfileRequest, User, UserProfile},
    services::{AppState, PortalError},
};

/// POST /api/v1/auth/login - Start the session for a user
pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, PortalError> {
    match state.store.login(&req.email, &req.password) {
        Some(user) => Ok((StatusCode::OK, Json(UserProfile::from(user)))),
        None => {
            tracing::warn!("Failed login attempt for {}", req.email);
            Err(PortalError::InvalidCredentials)
        }
    }
}

/// POST /api/v1/auth/signup - Register a new account (does not log in)
pub async fn signup(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SignUpData>,
) -> Result<impl IntoResponse, PortalError> {
    req.validate()?;

    let user = state
        .store
        .signup(req)
        .ok_or(PortalError::AccountExists)?;
    Ok((StatusCode::CREATED, Json(UserProfile::from(user))))
}

/// POST /api/v1/auth/logout - Clear the session
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.store.logout();
    tracing::info!("Session cleared");
    StatusCode::NO_CONTENT
}

/// GET /api/v1/auth/me - Session user profile
pub async fn get_current_user(Extension(user): Extension<User>) -> Json<UserProfile> {
    Json(UserProfile::from(user))
}

/// PUT /api/v1/auth/me - Edit the session user's profile
pub async fn update_current_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, PortalError> {
    req.validate()?;

    if let Some(email) = &req.email {
        let taken = state
            .store
            .users()
            .read(|users| users.iter().any(|u| u.id != user.id && &u.email == email));
        if taken {
            return Err(PortalError::AccountExists);
        }
    }

    let updated = req.apply_to(user);
    state.store.update_user(updated.clone());
    tracing::info!("Profile updated for {}", updated.id);

    Ok(Json(UserProfile::from(updated)))
}
