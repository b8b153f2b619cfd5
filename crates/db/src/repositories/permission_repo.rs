//! Repository for `permissions` and the `users_permissions` join table.

use greenlight_core::permissions::Permissions;
use greenlight_core::types::DbId;

use crate::error::DbError;
use crate::Db;

pub struct PermissionRepo;

impl PermissionRepo {
    /// All permission codes held by `user_id`. Unknown users hold none.
    pub async fn get_all_for_user(db: &Db, user_id: DbId) -> Result<Permissions, DbError> {
        let codes = db
            .run(
                sqlx::query_scalar::<_, String>(
                    "SELECT permissions.code
                     FROM permissions
                     INNER JOIN users_permissions
                         ON users_permissions.permission_id = permissions.id
                     WHERE users_permissions.user_id = $1",
                )
                .bind(user_id)
                .fetch_all(db.pool()),
            )
            .await?;
        Ok(Permissions::new(codes))
    }

    /// Grant `codes` to `user_id`.
    ///
    /// Codes already held are skipped and unknown codes are ignored. Returns
    /// the number of grants actually added.
    pub async fn add_for_user(db: &Db, user_id: DbId, codes: &[&str]) -> Result<u64, DbError> {
        let result = db
            .run(
                sqlx::query(
                    "INSERT INTO users_permissions (user_id, permission_id)
                     SELECT $1, permissions.id FROM permissions WHERE permissions.code = ANY($2)
                     ON CONFLICT DO NOTHING",
                )
                .bind(user_id)
                .bind(codes)
                .execute(db.pool()),
            )
            .await?;
        tracing::debug!(user_id, granted = result.rows_affected(), "Permissions granted");
        Ok(result.rows_affected())
    }
}
