use anyhow::Context;
use greenlight_db::config::DbConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Seed script used when `SEED_FILE` is unset.
const DEFAULT_SEED_FILE: &str = "db/seed/movies.sql";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "greenlight_seed=debug,greenlight_db=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DbConfig::from_env()?;

    let pool = greenlight_db::create_pool(&config)
        .await
        .context("Failed to connect to database")?;
    tracing::info!(
        max_connections = config.max_connections,
        "Database connection pool created"
    );

    greenlight_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    greenlight_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let seed_file = std::env::var("SEED_FILE").unwrap_or_else(|_| DEFAULT_SEED_FILE.into());
    let script = tokio::fs::read_to_string(&seed_file)
        .await
        .with_context(|| format!("Failed to read seed file {seed_file}"))?;

    let result = sqlx::raw_sql(&script)
        .execute(&pool)
        .await
        .with_context(|| format!("Failed to execute seed file {seed_file}"))?;
    tracing::info!(
        seed_file,
        rows = result.rows_affected(),
        "Seed completed"
    );

    pool.close().await;
    Ok(())
}
