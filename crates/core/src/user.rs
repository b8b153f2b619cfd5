//! User field validation.

use ::validator::ValidateEmail;

use crate::password::{validate_password_plaintext, PasswordHash, PlaintextPassword};
use crate::validator::{matches, Validator, EMAIL_RX};

/// Maximum name length in bytes.
pub const MAX_NAME_BYTES: usize = 500;

pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(!email.is_empty(), "email", "must be provided");
    v.check(
        matches(email, &EMAIL_RX) && email.validate_email(),
        "email",
        "must be a valid email address",
    );
}

/// Check a user's name, email and password.
///
/// `plaintext` is the password the hash was derived from, when the caller
/// still holds it (registration, password change).
pub fn validate_user(
    v: &mut Validator,
    name: &str,
    email: &str,
    plaintext: Option<&PlaintextPassword>,
    hash: &PasswordHash,
) {
    v.check(!name.is_empty(), "name", "must be provided");
    v.check(
        name.len() <= MAX_NAME_BYTES,
        "name",
        "must not be more than 500 bytes long",
    );

    validate_email(v, email);

    if let Some(plaintext) = plaintext {
        validate_password_plaintext(v, plaintext);
    }

    v.check(!hash.is_empty(), "password", "password hash is missing");
}
