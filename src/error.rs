//! # Error Handling
//!
//! Crate-level error type and its HTTP mapping. Handlers return
//! `Result<HttpResponse, AppError>`; the `ResponseError` impl turns every
//! variant into a consistent JSON error envelope:
//!
//! ```json
//! {
//!   "error": {
//!     "type": "validation_error",
//!     "message": "Weights too high (max 10)",
//!     "timestamp": "2025-01-01T12:00:00Z"
//!   }
//! }
//! ```
//!
//! The scoring core has its own two-variant `MatchError` taxonomy; both
//! variants are client-input problems and convert to 400 responses here.

use crate::matching::MatchError;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

/// Application error categories.
///
/// ## HTTP mapping:
/// - Internal/ConfigError → 500
/// - BadRequest/ValidationError → 400
/// - NotFound → 404
#[derive(Debug)]
pub enum AppError {
    /// Server-side failures (model loading, I/O, poisoned state)
    Internal(String),

    /// Client sent invalid or malformed data
    BadRequest(String),

    /// Requested resource does not exist
    NotFound(String),

    /// Configuration file or environment problems
    ConfigError(String),

    /// Input failed a validation rule
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_type, message) = match self {
            AppError::Internal(msg) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                msg.clone(),
            ),
            AppError::BadRequest(msg) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "bad_request",
                msg.clone(),
            ),
            AppError::NotFound(msg) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "not_found",
                msg.clone(),
            ),
            AppError::ConfigError(msg) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "config_error",
                msg.clone(),
            ),
            AppError::ValidationError(msg) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "validation_error",
                msg.clone(),
            ),
        };

        HttpResponse::build(status).json(json!({
            "error": {
                "type": error_type,
                "message": message,
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        }))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("JSON parsing error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

/// Scoring-core errors are structurally-invalid client input, never retried.
impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Shorthand for handler results.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_errors_map_to_bad_request() {
        let missing: AppError = MatchError::MissingData("first user".to_string()).into();
        assert!(matches!(missing, AppError::BadRequest(_)));

        let invalid: AppError = MatchError::InvalidWeight("topic: -1".to_string()).into();
        assert!(matches!(invalid, AppError::BadRequest(_)));
    }

    #[test]
    fn test_status_codes() {
        use actix_web::http::StatusCode;
        assert_eq!(
            AppError::NotFound("x".into()).error_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::ValidationError("x".into()).error_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("x".into()).error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
