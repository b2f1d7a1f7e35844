//! Application error type mapping to HTTP status codes and envelope format.

use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use fixwise_types::error::{ExchangeError, GatewayError, RepositoryError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors from the exchange orchestrator and session store.
    Exchange(ExchangeError),
    /// Authentication failure.
    Unauthorized(String),
    /// Validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<ExchangeError> for AppError {
    fn from(e: ExchangeError) -> Self {
        AppError::Exchange(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Exchange(e.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            AppError::Exchange(ExchangeError::NotFound) => {
                ("SESSION_NOT_FOUND", "Session not found".to_string())
            }
            AppError::Exchange(ExchangeError::EmptyMessage) => (
                "EMPTY_MESSAGE",
                "Message must contain text or a media attachment".to_string(),
            ),
            AppError::Exchange(ExchangeError::Gateway(GatewayError::RateLimited)) => (
                "RATE_LIMITED",
                "Generation service rate limit exceeded".to_string(),
            ),
            AppError::Exchange(ExchangeError::Gateway(e)) => ("UPSTREAM_ERROR", e.to_string()),
            AppError::Exchange(ExchangeError::Repository(e)) => ("STORAGE_ERROR", e.to_string()),
            AppError::Unauthorized(msg) => ("UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone()),
        };

        // The envelope derives the HTTP status from the error code.
        ApiResponse::error(code, &message, Uuid::now_v7().to_string(), 0).into_response()
    }
}
