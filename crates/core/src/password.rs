//! Argon2id password hashing with a plaintext/hash type split.
//!
//! [`PlaintextPassword`] is the transient secret received from a caller. It
//! has no serialization or database encoding, so it cannot be persisted by
//! accident. [`PasswordHash`] is the PHC-formatted Argon2id string and is the
//! only password representation the storage layer accepts.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::validator::Validator;

/// Minimum plaintext password length in bytes.
pub const MIN_PASSWORD_BYTES: usize = 8;

/// Maximum plaintext password length in bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(password_hash::Error);

impl From<password_hash::Error> for PasswordError {
    fn from(err: password_hash::Error) -> Self {
        Self(err)
    }
}

/// A password as typed by the user. Never stored, never logged.
#[derive(Clone)]
pub struct PlaintextPassword(String);

impl PlaintextPassword {
    pub fn new(plaintext: impl Into<String>) -> Self {
        Self(plaintext.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PlaintextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlaintextPassword(<redacted>)")
    }
}

/// Salted Argon2id hash in PHC string form.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash `plaintext` with Argon2id and a fresh random salt.
    pub fn from_plaintext(plaintext: &PlaintextPassword) -> Result<Self, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(plaintext.expose().as_bytes(), &salt)?;
        Ok(Self(hash.to_string()))
    }

    /// Check `plaintext` against this hash.
    ///
    /// Returns `Ok(false)` on a mismatch; `Err` only if the stored hash is
    /// malformed.
    pub fn matches(&self, plaintext: &PlaintextPassword) -> Result<bool, PasswordError> {
        let parsed = password_hash::PasswordHash::new(&self.0)?;
        match Argon2::default().verify_password(plaintext.expose().as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Wraps a hash read back from storage.
impl From<String> for PasswordHash {
    fn from(hash: String) -> Self {
        Self(hash)
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

pub fn validate_password_plaintext(v: &mut Validator, plaintext: &PlaintextPassword) {
    let len = plaintext.expose().len();
    v.check(len != 0, "password", "must be provided");
    v.check(
        len >= MIN_PASSWORD_BYTES,
        "password",
        "must be at least 8 bytes long",
    );
    v.check(
        len <= MAX_PASSWORD_BYTES,
        "password",
        "must not be more than 72 bytes long",
    );
}
