//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use marquee_core::{logging, ValidationErrors};

/// Body returned for every unexpected failure. Store details are logged, never sent.
pub const SERVER_ERROR_MESSAGE: &str = "Server error";

/// Error type returned by every handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(marquee_core::Error),
}

impl From<marquee_core::Error> for ApiError {
    fn from(err: marquee_core::Error) -> Self {
        match err {
            marquee_core::Error::Validation(errors) => ApiError::Validation(errors),
            marquee_core::Error::FavoriteNotFound(id) => {
                ApiError::NotFound(format!("Favorite {} not found", id))
            }
            marquee_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            marquee_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": "Validation failed",
                    "details": errors,
                }),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, serde_json::json!({ "error": msg })),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg }))
            }
            ApiError::Internal(err) => {
                tracing::error!(
                    subsystem = logging::SUBSYSTEM_API,
                    error = %err,
                    "Request failed with server error"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": SERVER_ERROR_MESSAGE }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
