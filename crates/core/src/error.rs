use std::time::Duration;

use crate::validator::ValidationErrors;

/// Error kinds surfaced to the API layer.
///
/// Every store reports "no such row" as [`CoreError::NotFound`], regardless of
/// which table was queried, so callers can apply one not-found policy.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("the requested resource could not be found")]
    NotFound,

    #[error("unable to update the record due to an edit conflict, please try again")]
    EditConflict,

    #[error("a user with this email address already exists")]
    DuplicateEmail,

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::password::PasswordError> for CoreError {
    fn from(err: crate::password::PasswordError) -> Self {
        CoreError::Internal(err.to_string())
    }
}
