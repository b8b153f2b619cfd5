use std::time::Duration;

use greenlight_core::error::CoreError;

/// Unique index guarding case-insensitive email uniqueness.
pub const USERS_EMAIL_UNIQUE_INDEX: &str = "users_email_lower_idx";

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Errors returned by every repository method.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,

    #[error("edit conflict: the record was modified or deleted")]
    EditConflict,

    #[error("duplicate email")]
    DuplicateEmail,

    #[error("database statement timed out after {0:?}")]
    Timeout(Duration),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DbError {
    /// `true` if this is a unique violation on `constraint`.
    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        match self {
            DbError::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                    && db_err.constraint() == Some(constraint)
            }
            _ => false,
        }
    }
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => CoreError::NotFound,
            DbError::EditConflict => CoreError::EditConflict,
            DbError::DuplicateEmail => CoreError::DuplicateEmail,
            DbError::Timeout(after) => CoreError::Timeout(after),
            DbError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                CoreError::Internal(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn sentinel_kinds_map_one_to_one() {
        assert_matches!(CoreError::from(DbError::NotFound), CoreError::NotFound);
        assert_matches!(CoreError::from(DbError::EditConflict), CoreError::EditConflict);
        assert_matches!(CoreError::from(DbError::DuplicateEmail), CoreError::DuplicateEmail);
        assert_matches!(
            CoreError::from(DbError::Timeout(Duration::from_secs(3))),
            CoreError::Timeout(d) if d == Duration::from_secs(3)
        );
    }

    #[test]
    fn storage_failures_become_internal() {
        let err = CoreError::from(DbError::from(sqlx::Error::PoolTimedOut));
        assert_matches!(err, CoreError::Internal(_));
    }

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!DbError::NotFound.is_unique_violation(USERS_EMAIL_UNIQUE_INDEX));
        assert!(!DbError::from(sqlx::Error::RowNotFound)
            .is_unique_violation(USERS_EMAIL_UNIQUE_INDEX));
    }
}
