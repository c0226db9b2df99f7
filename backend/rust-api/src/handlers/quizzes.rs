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
        quiz::{ListQuizzesQuery, QuizDraft, QuizResult, SubmitAttemptRequest},
        Quiz, QuizAttempt, User,
    },
    services::{quiz_service::QuizService, AppState, PortalError},
};

/// GET /api/v1/quizzes?published=true
pub async fn list_quizzes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuizzesQuery>,
) -> Json<Vec<Quiz>> {
    let service = QuizService::new(state.store.clone());
    Json(service.list_quizzes(query.published))
}

/// GET /api/v1/quizzes/{id}
pub async fn get_quiz(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Quiz>, PortalError> {
    let service = QuizService::new(state.store.clone());
    service
        .get_quiz(&id)
        .map(Json)
        .ok_or_else(|| PortalError::not_found("quiz", id))
}

/// POST /api/v1/quizzes - Enseignant only
pub async fn create_quiz(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    AppJson(draft): AppJson<QuizDraft>,
) -> Result<impl IntoResponse, PortalError> {
    let service = QuizService::new(state.store.clone());
    let quiz = service.create_quiz(&user, draft)?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

/// PUT /api/v1/quizzes/{id} - Author only
pub async fn update_quiz(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    AppJson(draft): AppJson<QuizDraft>,
) -> Result<Json<Quiz>, PortalError> {
    let service = QuizService::new(state.store.clone());
    ensure_author(&service, &user, &id)?;
    service.update_quiz(&id, draft).map(Json)
}

/// DELETE /api/v1/quizzes/{id} - Author only
pub async fn delete_quiz(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<StatusCode, PortalError> {
    let service = QuizService::new(state.store.clone());
    ensure_author(&service, &user, &id)?;
    service.delete_quiz(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/quizzes/{id}/publish - Toggle publication, author only
pub async fn toggle_publish(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<Quiz>, PortalError> {
    let service = QuizService::new(state.store.clone());
    ensure_author(&service, &user, &id)?;
    service.toggle_publish(&id).map(Json)
}

/// POST /api/v1/quizzes/{id}/attempts - Score answers; recorded when a session exists
pub async fn submit_attempt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<SubmitAttemptRequest>,
) -> Result<Json<QuizResult>, PortalError> {
    let service = QuizService::new(state.store.clone());
    let user = state.store.current_user();
    service
        .submit_attempt(user.as_ref(), &id, req.answers, req.time_taken)
        .map(Json)
}

/// GET /api/v1/quizzes/{id}/attempts - Enseignant only
pub async fn list_attempts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<QuizAttempt>>, PortalError> {
    let service = QuizService::new(state.store.clone());
    if service.get_quiz(&id).is_none() {
        return Err(PortalError::not_found("quiz", id));
    }
    Ok(Json(service.attempts_for_quiz(&id)))
}

fn ensure_author(service: &QuizService, user: &User, quiz_id: &str) -> Result<(), PortalError> {
    let quiz = service
        .get_quiz(quiz_id)
        .ok_or_else(|| PortalError::not_found("quiz", quiz_id))?;
    if quiz.teacher_id != user.id {
        tracing::warn!("{} tried to edit quiz {} owned by {}", user.id, quiz.id, quiz.teacher_id);
        return Err(PortalError::Forbidden("only the quiz author can change it"));
    }
    Ok(())
}
