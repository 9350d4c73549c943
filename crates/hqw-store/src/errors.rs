//! Error handling for hqw-store
//!
//! Wraps hqw-core HqError with store-specific helpers

use hqw_core::errors::{HqError, HqErrorKind};
use rusqlite::ErrorCode;

/// Result type alias using HqError
pub type Result<T> = std::result::Result<T, HqError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> HqError {
    HqError::new(HqErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> HqError {
    HqError::new(HqErrorKind::ConstraintViolation)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Stored text that no longer decodes into a domain value
pub fn decode_error(column: &str, value: &str, reason: impl std::fmt::Display) -> HqError {
    HqError::new(HqErrorKind::Serialization)
        .with_op("decode")
        .with_message(format!("cannot decode {} {:?}: {}", column, value, reason))
}

/// Create a database error from rusqlite::Error
///
/// Constraint failures (unique, foreign key, check, trigger aborts) get their
/// own kind; everything else is a persistence failure.
pub fn from_rusqlite(err: rusqlite::Error) -> HqError {
    let kind = match err.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => HqErrorKind::ConstraintViolation,
        _ => HqErrorKind::Persistence,
    };
    HqError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}
