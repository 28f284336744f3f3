//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::entities::ActionKind;
use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Project not found: {0}")]
    ProjectNotFound(Snowflake),

    #[error("Project not found: {0}")]
    ProjectNameNotFound(String),

    #[error("Action not found: {0}")]
    ActionNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Stars must be between 1 and 5, got {0}")]
    InvalidStars(i64),

    #[error("Review text must not be empty")]
    EmptyReviewText,

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("A reason is required")]
    EmptyReason,

    #[error("Adjustment delta must not be zero")]
    ZeroAdjustment,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Administrator privileges required")]
    PermissionDenied,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Actor already has a {0} on this project")]
    DuplicateContribution(ActionKind),

    #[error("Project name already in use: {0}")]
    ProjectNameTaken(String),

    #[error("Concurrent write conflict")]
    WriteConflict,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for replies and logs
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::ProjectNotFound(_) | Self::ProjectNameNotFound(_) => "UNKNOWN_PROJECT",
            Self::ActionNotFound(_) => "UNKNOWN_ACTION",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidStars(_) => "INVALID_STARS",
            Self::EmptyReviewText => "EMPTY_REVIEW_TEXT",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::EmptyReason => "EMPTY_REASON",
            Self::ZeroAdjustment => "ZERO_ADJUSTMENT",

            // Authorization
            Self::PermissionDenied => "PERMISSION_DENIED",

            // Conflict
            Self::DuplicateContribution(_) => "DUPLICATE_CONTRIBUTION",
            Self::ProjectNameTaken(_) => "PROJECT_NAME_TAKEN",
            Self::WriteConflict => "WRITE_CONFLICT",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProjectNotFound(_) | Self::ProjectNameNotFound(_) | Self::ActionNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidStars(_)
                | Self::EmptyReviewText
                | Self::ContentTooLong { .. }
                | Self::EmptyReason
                | Self::ZeroAdjustment
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::PermissionDenied)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::DuplicateContribution(_) | Self::ProjectNameTaken(_) | Self::WriteConflict
        )
    }

    /// Whether the whole operation may be retried from scratch
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::WriteConflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            DomainError::ProjectNotFound(Snowflake::new(1)).code(),
            "UNKNOWN_PROJECT"
        );
        assert_eq!(
            DomainError::DuplicateContribution(ActionKind::Like).code(),
            "DUPLICATE_CONTRIBUTION"
        );
        assert_eq!(DomainError::WriteConflict.code(), "WRITE_CONFLICT");
    }

    #[test]
    fn test_classification() {
        assert!(DomainError::ActionNotFound(Snowflake::new(9)).is_not_found());
        assert!(DomainError::InvalidStars(0).is_validation());
        assert!(DomainError::EmptyReason.is_validation());
        assert!(DomainError::PermissionDenied.is_authorization());
        assert!(DomainError::WriteConflict.is_conflict());
        assert!(DomainError::WriteConflict.is_retryable());
        assert!(!DomainError::DuplicateContribution(ActionKind::Like).is_retryable());
    }

    #[test]
    fn test_display_mentions_kind() {
        let err = DomainError::DuplicateContribution(ActionKind::Like);
        assert_eq!(err.to_string(), "Actor already has a like on this project");
    }
}
