// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::{engine::EngineError, models::course::CourseValidationError, store::StoreError};

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 403 Forbidden (authenticated, but not allowed to touch this resource)
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 404, the learner has no enrollment for the course. Not retried.
    NotEnrolled(String),

    // 409 Conflict (e.g., already enrolled, quiz module completed directly)
    Conflict(String),

    // 422, a quiz module points at a quiz the course does not contain.
    QuizUnavailable(String),

    // 503, the store could not be reached. The caller may retry.
    ServiceUnavailable(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut retryable = false;
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::NotEnrolled(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::QuizUnavailable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::ServiceUnavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                retryable = true;
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                )
            }
        };

        let body = if retryable {
            Json(json!({ "error": error_message, "retryable": true }))
        } else {
            Json(json!({ "error": error_message }))
        };

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound("Record not found".to_string()),
            StoreError::Conflict => AppError::Conflict("Record already exists".to_string()),
            StoreError::Unavailable(msg) => AppError::ServiceUnavailable(msg),
            StoreError::Serialization(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let msg = err.to_string();
        match err {
            EngineError::ModuleNotFound(_) => AppError::NotFound(msg),
            EngineError::QuizNotFound(_) | EngineError::UnknownQuiz(_) => {
                AppError::QuizUnavailable(msg)
            }
            EngineError::QuizGated(_) => AppError::Conflict(msg),
            EngineError::NotAQuiz(_) => AppError::BadRequest(msg),
        }
    }
}

impl From<CourseValidationError> for AppError {
    fn from(err: CourseValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
