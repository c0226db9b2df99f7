use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::{
    extractors::AppJson,
    models::contact::ContactRequest,
    services::{contact_service::ContactService, AppState, PortalError},
};

/// POST /api/v1/contact
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ContactRequest>,
) -> Result<impl IntoResponse, PortalError> {
    let service = ContactService::new(state.store.clone());
    let submission = service.submit_contact(req)?;
    Ok((StatusCode::CREATED, Json(submission)))
}
