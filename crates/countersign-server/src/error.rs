//! HTTP error types.
//!
//! Maps domain errors from `countersign-core` into HTTP responses. Every
//! error variant produces a JSON body with a machine-readable `error` field
//! and a human-readable `message`. Internal details are logged server-side,
//! never echoed to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use countersign_core::{DocumentError, SectionError};

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Client sent invalid input (missing field, write-once violation).
    BadRequest(String),
    /// The presented code matched nothing.
    Unauthorized(String),
    /// Requested resource not found.
    NotFound(String),
    /// Internal server error (storage failure).
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error".to_owned(),
                )
            }
        };

        let body = ErrorBody {
            error: error_type,
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound => Self::NotFound(err.to_string()),
            DocumentError::AlreadySigned { .. } | DocumentError::MissingField { .. } => {
                Self::BadRequest(err.to_string())
            }
            DocumentError::InvalidCode => Self::Unauthorized(err.to_string()),
            DocumentError::Store(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<SectionError> for AppError {
    fn from(err: SectionError) -> Self {
        match err {
            SectionError::AlreadySigned { .. } | SectionError::MissingField { .. } => {
                Self::BadRequest(err.to_string())
            }
            SectionError::Store(_) => Self::Internal(err.to_string()),
        }
    }
}
