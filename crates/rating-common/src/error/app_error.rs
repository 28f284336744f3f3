//! Application error types
//!
//! The outermost error layer. Everything an actor can be told about a failure
//! passes through [`AppError`] and is rendered as an [`ErrorResponse`].

use rating_core::DomainError;
use serde::Serialize;
use std::fmt;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authorization errors
    #[error("Administrator privileges required")]
    PermissionDenied,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Rate limiting
    #[error("Try again in {retry_after_secs} sec")]
    Throttled { retry_after_secs: u64 },

    // Retries exhausted
    #[error("The ledger is busy, please try again")]
    TransientFailure,

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    // Redis errors
    #[error("Cache error: {0}")]
    Cache(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Get error code for replies
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Throttled { .. } => "THROTTLED",
            Self::TransientFailure => "TRANSIENT_FAILURE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    /// Caused by the actor's input rather than by the system
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::PermissionDenied
            | Self::Validation(_)
            | Self::InvalidInput(_)
            | Self::NotFound(_)
            | Self::Conflict(_)
            | Self::Throttled { .. } => true,
            Self::Domain(e) => {
                e.is_not_found() || e.is_validation() || e.is_authorization() || e.is_conflict()
            }
            _ => false,
        }
    }

    /// Caused by infrastructure; logged at `error`
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Message safe to show an actor; internals are never echoed
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.is_server_error() && !matches!(self, Self::TransientFailure) {
            "Something went wrong, please try again later".to_string()
        } else {
            self.to_string()
        }
    }

    /// Create a not found error for a resource type
    #[must_use]
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::NotFound(resource.to_string())
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Serializable error reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        let details = match err {
            AppError::Throttled { retry_after_secs } => {
                Some(serde_json::json!({ "retry_after_secs": retry_after_secs }))
            }
            _ => None,
        };
        Self {
            code: err.error_code().to_string(),
            message: err.public_message(),
            details,
        }
    }
}

impl From<AppError> for ErrorResponse {
    fn from(err: AppError) -> Self {
        Self::from(&err)
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rating_core::{ActionKind, Snowflake};

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::PermissionDenied.error_code(), "PERMISSION_DENIED");
        assert_eq!(
            AppError::Throttled { retry_after_secs: 3 }.error_code(),
            "THROTTLED"
        );
        assert_eq!(
            AppError::from(DomainError::InvalidStars(9)).error_code(),
            "INVALID_STARS"
        );
    }

    #[test]
    fn test_classification() {
        assert!(AppError::from(DomainError::DuplicateContribution(ActionKind::Like)).is_client_error());
        assert!(AppError::from(DomainError::ProjectNotFound(Snowflake::new(1))).is_client_error());
        assert!(AppError::Database("down".into()).is_server_error());
        assert!(AppError::TransientFailure.is_server_error());
        assert!(AppError::from(DomainError::DatabaseError("x".into())).is_server_error());
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let response = ErrorResponse::from(AppError::Database("password=hunter2".into()));
        assert_eq!(response.code, "DATABASE_ERROR");
        assert!(!response.message.contains("hunter2"));

        let transient = ErrorResponse::from(AppError::TransientFailure);
        assert_eq!(transient.message, "The ledger is busy, please try again");
    }

    #[test]
    fn test_throttled_response_carries_wait() {
        let response = ErrorResponse::from(AppError::Throttled { retry_after_secs: 42 });
        assert_eq!(response.message, "Try again in 42 sec");
        assert_eq!(response.details.unwrap()["retry_after_secs"], 42);
    }

    #[test]
    fn test_helper_methods() {
        let err = AppError::not_found("project 123");
        assert_eq!(err.to_string(), "Resource not found: project 123");

        let err = AppError::validation("name is required");
        assert_eq!(err.to_string(), "Validation error: name is required");
    }
}
