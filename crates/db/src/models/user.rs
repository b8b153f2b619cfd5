//! User entity model and DTOs.

use greenlight_core::password::{PasswordError, PasswordHash, PlaintextPassword};
use greenlight_core::types::{DbId, Timestamp};
use greenlight_core::user::validate_user;
use greenlight_core::validator::Validator;
use serde::Serialize;
use sqlx::FromRow;

/// Reserved identity of the anonymous user. `BIGSERIAL` ids start at 1, so
/// no stored row can carry it.
pub const ANONYMOUS_USER_ID: DbId = -1;

/// Full user row from the `users` table.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub created_at: Timestamp,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    #[sqlx(try_from = "String")]
    pub password_hash: PasswordHash,
    pub activated: bool,
    #[serde(skip)]
    pub version: i32,
}

impl User {
    /// The "no authenticated user" value.
    pub fn anonymous() -> Self {
        Self {
            id: ANONYMOUS_USER_ID,
            ..Self::default()
        }
    }

    /// Anonymity is decided by identity, not by empty fields: a zero-valued
    /// `User::default()` is not anonymous.
    pub fn is_anonymous(&self) -> bool {
        self.id == ANONYMOUS_USER_ID
    }

    /// Replace the password hash. The plaintext is dropped after hashing.
    pub fn set_password(&mut self, plaintext: &PlaintextPassword) -> Result<(), PasswordError> {
        self.password_hash = PasswordHash::from_plaintext(plaintext)?;
        Ok(())
    }

    pub fn validate(&self, v: &mut Validator, plaintext: Option<&PlaintextPassword>) {
        validate_user(v, &self.name, &self.email, plaintext, &self.password_hash);
    }
}

/// DTO for inserting a user. Holds only the password hash.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: PasswordHash,
    pub activated: bool,
}

impl CreateUser {
    /// Build an unactivated user, hashing `plaintext`.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        plaintext: &PlaintextPassword,
    ) -> Result<Self, PasswordError> {
        Ok(Self {
            name: name.into(),
            email: email.into(),
            password_hash: PasswordHash::from_plaintext(plaintext)?,
            activated: false,
        })
    }

    pub fn validate(&self, v: &mut Validator, plaintext: Option<&PlaintextPassword>) {
        validate_user(v, &self.name, &self.email, plaintext, &self.password_hash);
    }
}
