//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use rating_common::AppError;
use rating_core::DomainError;
use thiserror::Error;

/// Service layer error type
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Domain rule violation
    #[error("{0}")]
    Domain(#[source] DomainError),

    /// Application error (config, validation, etc.)
    #[error("{0}")]
    App(#[source] AppError),

    /// Resource not found
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// Actor lacks administrator privileges
    #[error("Administrator privileges required")]
    PermissionDenied,

    #[error("Validation error: {0}")]
    Validation(String),

    /// Input the current conversation step does not accept
    #[error("Unexpected input: {0}")]
    UnexpectedInput(String),

    /// Cooldown window still open
    #[error("Try again in {retry_after_secs} sec")]
    Throttled { retry_after_secs: u64 },

    /// Write conflicts persisted through every retry
    #[error("The ledger is busy, please try again")]
    TransientFailure,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an unexpected input error
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::UnexpectedInput(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the error code for replies
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::UnexpectedInput(_) => "UNEXPECTED_INPUT",
            Self::Throttled { .. } => "THROTTLED",
            Self::TransientFailure => "TRANSIENT_FAILURE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::PermissionDenied => Self::PermissionDenied,
            other => Self::Domain(other),
        }
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} {id}"))
            }
            ServiceError::PermissionDenied => AppError::PermissionDenied,
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::UnexpectedInput(msg) => AppError::InvalidInput(msg),
            ServiceError::Throttled { retry_after_secs } => {
                AppError::Throttled { retry_after_secs }
            }
            ServiceError::TransientFailure => AppError::TransientFailure,
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
