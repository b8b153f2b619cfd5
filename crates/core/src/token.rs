//! Bearer token generation and hashing.
//!
//! A token's plaintext is handed to the caller once and never persisted. Only
//! its SHA-256 digest ([`TokenHash`]) reaches storage; lookups hash the
//! presented plaintext and match on the digest.

use std::fmt;

use chrono::Duration;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::types::{DbId, Timestamp};
use crate::validator::Validator;

/// Length of a token plaintext in alphanumeric characters (~154 bits).
pub const TOKEN_LENGTH: usize = 26;

/// Known token scopes.
pub mod scopes {
    pub const ACTIVATION: &str = "activation";
    pub const AUTHENTICATION: &str = "authentication";
    pub const PASSWORD_RESET: &str = "password-reset";
}

/// The token as given to the client. Never stored, never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPlaintext(String);

impl TokenPlaintext {
    pub fn new(plaintext: impl Into<String>) -> Self {
        Self(plaintext.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn hash(&self) -> TokenHash {
        TokenHash(Sha256::digest(self.0.as_bytes()).into())
    }
}

impl fmt::Debug for TokenPlaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenPlaintext(<redacted>)")
    }
}

/// SHA-256 digest of a token plaintext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenHash([u8; 32]);

impl TokenHash {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A freshly generated token: the plaintext plus what gets stored.
#[derive(Debug, Clone)]
pub struct NewToken {
    pub plaintext: TokenPlaintext,
    pub hash: TokenHash,
    pub user_id: DbId,
    pub expiry: Timestamp,
    pub scope: String,
}

/// Generate a random token for `user_id`, expiring `ttl` from now.
pub fn generate_token(user_id: DbId, ttl: Duration, scope: &str) -> NewToken {
    let plaintext: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();
    let plaintext = TokenPlaintext(plaintext);

    NewToken {
        hash: plaintext.hash(),
        plaintext,
        user_id,
        expiry: chrono::Utc::now() + ttl,
        scope: scope.to_string(),
    }
}

pub fn validate_token_plaintext(v: &mut Validator, plaintext: &TokenPlaintext) {
    v.check(!plaintext.expose().is_empty(), "token", "must be provided");
    v.check(
        plaintext.expose().len() == TOKEN_LENGTH,
        "token",
        "must be 26 bytes long",
    );
}
