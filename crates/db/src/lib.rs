//! PostgreSQL storage for movies, users, tokens and permissions.
//!
//! Repositories are zero-sized structs whose async methods take a [`Db`]
//! handle as the first argument. Every method issues a single statement,
//! bounded by the handle's query timeout.

use std::future::Future;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod config;
pub mod error;
pub mod models;
pub mod repositories;

use config::DbConfig;
use error::DbError;

pub type DbPool = sqlx::PgPool;

/// Per-statement deadline used when none is configured.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(3);

/// Time allowed to acquire a connection during pool setup.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection pool plus the deadline applied to every repository statement.
///
/// Cheap to clone; the pool is reference counted.
#[derive(Debug, Clone)]
pub struct Db {
    pool: DbPool,
    query_timeout: Duration,
}

impl Db {
    pub fn new(pool: DbPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Await `fut` under the query timeout.
    ///
    /// On expiry the statement future is dropped, which cancels it, and
    /// [`DbError::Timeout`] is returned.
    pub(crate) async fn run<T, F>(&self, fut: F) -> Result<T, DbError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result.map_err(DbError::from),
            Err(_) => {
                tracing::warn!(timeout = ?self.query_timeout, "Database statement timed out");
                Err(DbError::Timeout(self.query_timeout))
            }
        }
    }
}

impl From<DbPool> for Db {
    fn from(pool: DbPool) -> Self {
        Self::new(pool, DEFAULT_QUERY_TIMEOUT)
    }
}

/// Create a connection pool from configuration.
pub async fn create_pool(config: &DbConfig) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .idle_timeout(config.idle_timeout)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&config.database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
