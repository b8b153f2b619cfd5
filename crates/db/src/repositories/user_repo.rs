//! Repository for the `users` table.

use greenlight_core::token::TokenPlaintext;

use crate::error::{DbError, USERS_EMAIL_UNIQUE_INDEX};
use crate::models::user::{CreateUser, User};
use crate::Db;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, created_at, name, email, password_hash, activated, version";

/// Provides lookup and persistence for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// Emails are unique case-insensitively; a clash yields
    /// [`DbError::DuplicateEmail`].
    pub async fn insert(db: &Db, input: &CreateUser) -> Result<User, DbError> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, activated)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let user = db
            .run(
                sqlx::query_as::<_, User>(&query)
                    .bind(&input.name)
                    .bind(&input.email)
                    .bind(input.password_hash.as_str())
                    .bind(input.activated)
                    .fetch_one(db.pool()),
            )
            .await
            .map_err(duplicate_email)?;
        tracing::debug!(user_id = user.id, "User inserted");
        Ok(user)
    }

    /// Find a user by email, ignoring case.
    pub async fn get_by_email(db: &Db, email: &str) -> Result<User, DbError> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)");
        db.run(
            sqlx::query_as::<_, User>(&query)
                .bind(email)
                .fetch_optional(db.pool()),
        )
        .await?
        .ok_or(DbError::NotFound)
    }

    /// Overwrite the mutable fields of `user` if its version still matches.
    /// Returns the new version.
    pub async fn update(db: &Db, user: &User) -> Result<i32, DbError> {
        let version = db
            .run(
                sqlx::query_scalar::<_, i32>(
                    "UPDATE users
                     SET name = $1, email = $2, password_hash = $3, activated = $4,
                         version = version + 1
                     WHERE id = $5 AND version = $6
                     RETURNING version",
                )
                .bind(&user.name)
                .bind(&user.email)
                .bind(user.password_hash.as_str())
                .bind(user.activated)
                .bind(user.id)
                .bind(user.version)
                .fetch_optional(db.pool()),
            )
            .await
            .map_err(duplicate_email)?;

        match version {
            Some(version) => {
                tracing::debug!(user_id = user.id, version, "User updated");
                Ok(version)
            }
            None => {
                tracing::warn!(
                    user_id = user.id,
                    expected_version = user.version,
                    "User update lost an edit conflict"
                );
                Err(DbError::EditConflict)
            }
        }
    }

    /// Find the owner of an unexpired token with the given scope.
    ///
    /// Unknown, expired and wrong-scope tokens are all [`DbError::NotFound`].
    pub async fn get_for_token(
        db: &Db,
        scope: &str,
        plaintext: &TokenPlaintext,
    ) -> Result<User, DbError> {
        let hash = plaintext.hash();
        let query = "SELECT users.id, users.created_at, users.name, users.email,
                            users.password_hash, users.activated, users.version
                     FROM users
                     INNER JOIN tokens ON users.id = tokens.user_id
                     WHERE tokens.hash = $1
                       AND tokens.scope = $2
                       AND tokens.expiry > NOW()";
        db.run(
            sqlx::query_as::<_, User>(query)
                .bind(hash.as_bytes())
                .bind(scope)
                .fetch_optional(db.pool()),
        )
        .await?
        .ok_or(DbError::NotFound)
    }
}

fn duplicate_email(err: DbError) -> DbError {
    if err.is_unique_violation(USERS_EMAIL_UNIQUE_INDEX) {
        tracing::warn!("Rejected duplicate user email");
        DbError::DuplicateEmail
    } else {
        err
    }
}
