//! Crossroads — API error types.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crossroads_content::ContentError;
use crossroads_core::error::DomainError;
use crossroads_remote::ClientError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the servers.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A content pack failed to load.
    #[error("content error: {0}")]
    Content(#[from] ContentError),

    /// The HTTP client for cross-server calls could not be built.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(DomainError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self.0 {
            DomainError::Unauthorized(m) => (StatusCode::FORBIDDEN, "unauthorized", m),
            DomainError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m),
            DomainError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m),
            DomainError::StateConflict(m) => (StatusCode::CONFLICT, "state_conflict", m),
            DomainError::Remote(m) => (StatusCode::BAD_GATEWAY, "remote_call_failed", m),
            DomainError::Infrastructure(m) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "infrastructure_error",
                m,
            ),
        };

        let body = ErrorBody {
            error: error_code,
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// `Json` whose rejections become 400 validation errors with an
/// `ErrorBody`.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
