//! Error handling utilities for repositories

use rating_core::error::DomainError;
use rating_core::value_objects::Snowflake;
use sqlx::Error as SqlxError;

/// serialization_failure
const SERIALIZATION_FAILURE: &str = "40001";
/// deadlock_detected
const DEADLOCK_DETECTED: &str = "40P01";

/// Convert SQLx error to DomainError
///
/// Serialization failures and deadlocks become [`DomainError::WriteConflict`]
/// so the ledger can retry them.
pub fn map_db_error(e: SqlxError) -> DomainError {
    if let Some(db_err) = e.as_database_error() {
        if matches!(
            db_err.code().as_deref(),
            Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED)
        ) {
            return DomainError::WriteConflict;
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    map_db_error(e)
}

/// Create a "project not found" error
pub fn project_not_found(id: Snowflake) -> DomainError {
    DomainError::ProjectNotFound(id)
}

/// Create an "action not found" error
pub fn action_not_found(id: Snowflake) -> DomainError {
    DomainError::ActionNotFound(id)
}
