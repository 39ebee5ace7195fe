use divelog_sdk::DiveLogError;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

use crate::auth::Rejection;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldViolation>),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthenticated(String),

    /// The caller's session no longer matches storage.
    #[error("{0}")]
    StaleSession(Rejection),

    #[error("Database error: {0}")]
    Database(anyhow::Error),
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl DomainError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation::new(field, message)])
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    /// The session version moved on since the caller's token was issued.
    pub fn stale_session() -> Self {
        Self::StaleSession(Rejection::VersionMismatch)
    }

    pub fn account_gone() -> Self {
        Self::StaleSession(Rejection::UnknownUser)
    }
}

/// Repository errors. A unique-key violation surfacing from the database
/// becomes a conflict; everything else is a database error.
impl From<anyhow::Error> for DomainError {
    fn from(e: anyhow::Error) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) =
            e.downcast_ref::<DbErr>().and_then(DbErr::sql_err)
        {
            tracing::debug!(%detail, "Unique constraint violated");
            return Self::Conflict("Resource already exists".to_owned());
        }
        Self::Database(e)
    }
}

impl From<DbErr> for DomainError {
    fn from(e: DbErr) -> Self {
        anyhow::Error::from(e).into()
    }
}

/// Convert domain errors to SDK errors for public API consumption.
impl From<DomainError> for DiveLogError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { .. } => DiveLogError::not_found(),
            DomainError::Validation(violations) => match violations.into_iter().next() {
                Some(v) => DiveLogError::validation(v.field, v.message),
                None => DiveLogError::validation("", "invalid input"),
            },
            DomainError::Conflict(msg) => DiveLogError::Conflict(msg),
            DomainError::Unauthenticated(_) | DomainError::StaleSession(_) => {
                DiveLogError::Unauthenticated
            }
            DomainError::Database(e) => {
                tracing::error!(error = ?e, "Database error behind client call");
                DiveLogError::internal()
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = DbErr::Query(sea_orm::RuntimeErr::Internal(
            "UNIQUE constraint failed: users.email".to_owned(),
        ));
        // Only driver errors carry a SQL state; a plain runtime error stays a database error.
        assert!(matches!(DomainError::from(err), DomainError::Database(_)));
    }

    #[test]
    fn validation_lists_every_field() {
        let err = DomainError::Validation(vec![
            FieldViolation::new("site_name", "must not be empty"),
            FieldViolation::new("bottom_time_min", "must be positive"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: site_name: must not be empty; bottom_time_min: must be positive"
        );
    }

    #[test]
    fn sdk_error_keeps_first_violation() {
        let sdk: DiveLogError = DomainError::validation("depth", "unknown unit 'x'").into();
        assert_eq!(sdk, DiveLogError::validation("depth", "unknown unit 'x'"));
    }

    #[test]
    fn database_error_hides_details_from_sdk() {
        let sdk: DiveLogError = DomainError::Database(anyhow::anyhow!("disk full")).into();
        assert_eq!(sdk, DiveLogError::Internal);
    }
}
