use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Rejections raised by the domain services. Plain lookups that miss return
/// `None` instead; this type is for requests that cannot be carried out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortalError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("an account with this email or username already exists")]
    AccountExists,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("authentication required")]
    NotAuthenticated,
    #[error("{0}")]
    Forbidden(&'static str),
}

impl PortalError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        PortalError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PortalError::MissingField(_)
            | PortalError::InvalidRating(_)
            | PortalError::Validation(_) => StatusCode::BAD_REQUEST,
            PortalError::NotFound { .. } => StatusCode::NOT_FOUND,
            PortalError::AccountExists => StatusCode::CONFLICT,
            PortalError::InvalidCredentials | PortalError::NotAuthenticated => {
                StatusCode::UNAUTHORIZED
            }
            PortalError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

/// JSON body shaped like the `AppJson` rejection: `{"message", "status"}`.
impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_client_error() {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }
        let body = json!({
            "message": self.to_string(),
            "status": status.as_u16()
        });
        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for PortalError {
    fn from(errors: validator::ValidationErrors) -> Self {
        PortalError::Validation(errors.to_string())
    }
}

/// Blank or whitespace-only input counts as missing.
pub(crate) fn require(value: &str, field: &'static str) -> Result<(), PortalError> {
    if value.trim().is_empty() {
        Err(PortalError::MissingField(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PortalError::MissingField("title").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PortalError::not_found("quiz", "q1").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(PortalError::AccountExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            PortalError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            PortalError::Forbidden("teachers only").status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("x", "name").is_ok());
        assert_eq!(
            require(" \t", "name").unwrap_err().to_string(),
            "name is required"
        );
    }
}
