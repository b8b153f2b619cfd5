//! Repository for the `tokens` table.

use chrono::Duration;
use greenlight_core::token::{generate_token, NewToken};
use greenlight_core::types::DbId;

use crate::error::DbError;
use crate::Db;

/// Persists hashed tokens. Plaintexts never reach this table.
pub struct TokenRepo;

impl TokenRepo {
    /// Generate a token for `user_id` and store its hash. The returned
    /// [`NewToken`] is the only place the plaintext is available.
    #[allow(clippy::new_ret_no_self)]
    pub async fn new(
        db: &Db,
        user_id: DbId,
        ttl: Duration,
        scope: &str,
    ) -> Result<NewToken, DbError> {
        let token = generate_token(user_id, ttl, scope);
        Self::insert(db, &token).await?;
        Ok(token)
    }

    /// Store an already generated token.
    pub async fn insert(db: &Db, token: &NewToken) -> Result<(), DbError> {
        db.run(
            sqlx::query(
                "INSERT INTO tokens (hash, user_id, expiry, scope)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(token.hash.as_bytes())
            .bind(token.user_id)
            .bind(token.expiry)
            .bind(&token.scope)
            .execute(db.pool()),
        )
        .await?;
        tracing::debug!(user_id = token.user_id, scope = %token.scope, "Token stored");
        Ok(())
    }

    /// Delete every token of `scope` owned by `user_id`. Returns the number
    /// of rows removed; zero is not an error.
    pub async fn delete_all_for_user(db: &Db, scope: &str, user_id: DbId) -> Result<u64, DbError> {
        let result = db
            .run(
                sqlx::query("DELETE FROM tokens WHERE scope = $1 AND user_id = $2")
                    .bind(scope)
                    .bind(user_id)
                    .execute(db.pool()),
            )
            .await?;
        tracing::debug!(user_id, scope, deleted = result.rows_affected(), "Tokens deleted");
        Ok(result.rows_affected())
    }

    /// Remove every token whose expiry has passed.
    pub async fn delete_expired(db: &Db) -> Result<u64, DbError> {
        let result = db
            .run(sqlx::query("DELETE FROM tokens WHERE expiry <= NOW()").execute(db.pool()))
            .await?;
        Ok(result.rows_affected())
    }
}
