use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Why a request was refused after (or without) authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Forbidden {
    #[error("User not authenticated")]
    NotAuthenticated,
    #[error("Only teachers can perform this action")]
    InsufficientRole,
    #[error("Not authorized")]
    NotOwner,
}

/// Application-level error type for HTTP handlers.
///
/// Every failure a handler can produce ends up here and is mapped to a status
/// code and a `{ success, error, message }` body by [`IntoResponse`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("forbidden: {0}")]
    Forbidden(Forbidden),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("server error: {0}")]
    Server(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<Forbidden> for AppError {
    fn from(reason: Forbidden) -> Self {
        AppError::Forbidden(reason)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateTitle => {
                AppError::Duplicate("A course with this title already exists".into())
            }
            StoreError::NotFound(_) => AppError::NotFound("Course"),
            other => AppError::Server(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "Validation failed".to_string(), msg.clone())
            }
            AppError::Duplicate(msg) => {
                (StatusCode::BAD_REQUEST, "Duplicate Error".to_string(), msg.clone())
            }
            AppError::Auth(err) => (StatusCode::UNAUTHORIZED, err.to_string(), err.to_string()),
            AppError::Forbidden(reason) => {
                (StatusCode::FORBIDDEN, "Access denied".to_string(), reason.to_string())
            }
            AppError::NotFound(entity) => {
                let msg = format!("{entity} not found");
                (StatusCode::NOT_FOUND, msg.clone(), msg)
            }
            AppError::Server(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server Error".to_string(),
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "success": false,
            "error": error,
            "message": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
