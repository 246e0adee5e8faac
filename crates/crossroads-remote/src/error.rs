//! HTTP client errors and their mapping onto `DomainError`.

use crossroads_core::error::DomainError;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },
}

impl ClientError {
    /// Builds a status error from a response body, preferring the
    /// `message` of a JSON error body over the raw text.
    #[must_use]
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: String,
        }

        let message = serde_json::from_str::<ErrorBody>(body)
            .map_or_else(|_| body.trim().to_owned(), |parsed| parsed.message);
        Self::Status { status, message }
    }
}

impl From<ClientError> for DomainError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) => Self::Remote(e.to_string()),
            ClientError::Status { status, message } => match status {
                StatusCode::BAD_REQUEST => Self::Validation(message),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(message),
                StatusCode::NOT_FOUND => Self::NotFound(message),
                StatusCode::CONFLICT => Self::StateConflict(message),
                _ => Self::Remote(format!("{status}: {message}")),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_body_message_is_extracted() {
        let err = ClientError::from_body(
            StatusCode::FORBIDDEN,
            r#"{"error":"unauthorized","message":"Invalid secret"}"#,
        );

        let domain: DomainError = err.into();

        assert!(matches!(domain, DomainError::Unauthorized(m) if m == "Invalid secret"));
    }

    #[test]
    fn test_plain_text_body_is_kept() {
        let err = ClientError::from_body(StatusCode::CONFLICT, "not in setup mode\n");

        let domain: DomainError = err.into();

        assert!(matches!(domain, DomainError::StateConflict(m) if m == "not in setup mode"));
    }

    #[test]
    fn test_status_mapping() {
        let map = |status| DomainError::from(ClientError::from_body(status, "x"));

        assert!(matches!(map(StatusCode::BAD_REQUEST), DomainError::Validation(_)));
        assert!(matches!(map(StatusCode::NOT_FOUND), DomainError::NotFound(_)));
        assert!(matches!(map(StatusCode::UNAUTHORIZED), DomainError::Unauthorized(_)));
        assert!(matches!(
            map(StatusCode::INTERNAL_SERVER_ERROR),
            DomainError::Remote(_)
        ));
        assert!(matches!(map(StatusCode::BAD_GATEWAY), DomainError::Remote(_)));
    }
}
