//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion.
//!
//! Authentication failures carry a six-way taxonomy because each
//! variant maps to a distinct client-facing message: the frontend
//! decides between re-login and retry based on it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Token verification / admission failure taxonomy.
///
/// Every variant is rejected with HTTP 401. The distinction matters to
/// clients: `Expired` means re-login, the rest mean the token is unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("Missing or malformed authentication token")]
    MissingToken,

    #[error("Authentication token has expired")]
    Expired,

    #[error("Authentication token is malformed")]
    Malformed,

    #[error("Unsupported authentication token format")]
    Unsupported,

    #[error("Authentication token signature is invalid")]
    BadSignature,

    #[error("Authentication token verification failed")]
    Other,
}

impl AuthFailure {
    /// Stable machine-readable label for logs and tests.
    pub fn label(&self) -> &'static str {
        match self {
            AuthFailure::MissingToken => "missing_or_malformed_token",
            AuthFailure::Expired => "expired",
            AuthFailure::Malformed => "malformed",
            AuthFailure::Unsupported => "unsupported",
            AuthFailure::BadSignature => "bad_signature",
            AuthFailure::Other => "generic_auth_failure",
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Request admission / token verification
    #[error(transparent)]
    Auth(#[from] AuthFailure),

    // Login failures deliberately do not reveal which half was wrong
    #[error("Invalid username or password")]
    InvalidCredentials,

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("New password must be longer than 7 characters and contain a digit, a letter and a special character")]
    WeakPassword,

    #[error("Phone number is already registered")]
    DuplicatePhone,

    // Conflicts (retryable or state-dependent business failures)
    #[error("Student is already enrolled in this course")]
    AlreadyEnrolled,

    #[error("Student is not enrolled in this course")]
    NotEnrolled,

    #[error("Student identifier sequence is exhausted for this major and year")]
    SequenceExhausted,

    #[error("Student identifier allocation conflict, please retry registration")]
    AllocationConflict,

    #[error("{0} already exists")]
    Conflict(String),

    #[error("{0} is referenced by existing records and cannot be deleted")]
    InUse(&'static str),

    // Lookups; surfaced as business failures (400), not 404, to match
    // the flat response envelope the frontend consumes
    #[error("{0} not found")]
    NotFound(&'static str),

    // External service errors
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Flat error body: `{"code": <http status>, "message": "<text>"}`
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl AppError {
    /// Get HTTP status code
    fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // Everything else is a business failure in the flat envelope
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Convenience constructors
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            code: status.as_u16(),
            message: self.user_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: &'static str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &'static str) -> AppResult<T> {
        self.ok_or(AppError::NotFound(entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_401() {
        for failure in [
            AuthFailure::MissingToken,
            AuthFailure::Expired,
            AuthFailure::Malformed,
            AuthFailure::Unsupported,
            AuthFailure::BadSignature,
            AuthFailure::Other,
        ] {
            assert_eq!(AppError::from(failure).status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn business_failures_map_to_400() {
        assert_eq!(
            AppError::NotFound("Student").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::AlreadyEnrolled.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::SequenceExhausted.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InvalidCredentials.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn taxonomy_labels_are_distinct() {
        let labels = [
            AuthFailure::MissingToken.label(),
            AuthFailure::Expired.label(),
            AuthFailure::Malformed.label(),
            AuthFailure::Unsupported.label(),
            AuthFailure::BadSignature.label(),
            AuthFailure::Other.label(),
        ];
        let unique: std::collections::HashSet<_> = labels.iter().collect();
        assert_eq!(unique.len(), labels.len());
    }
}
