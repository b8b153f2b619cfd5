use std::str::FromStr;
use std::time::Duration;

/// Default maximum pool size.
const DEFAULT_MAX_OPEN_CONNECTIONS: u32 = 25;
/// Default floor of connections the pool keeps open.
const DEFAULT_MIN_CONNECTIONS: u32 = 0;
/// Default idle lifetime of a pooled connection, in seconds.
const DEFAULT_MAX_IDLE_TIME_SECS: u64 = 900;
/// Default per-statement deadline, in seconds.
const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 3;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Database pool configuration.
///
/// `min_connections` is a floor, not an idle cap: the pool opens that many
/// connections eagerly and replaces any closed by `idle_timeout`. sqlx has no
/// upper limit on idle connections, so there is no setting for one.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub idle_timeout: Duration,
    pub query_timeout: Duration,
}

impl DbConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                          | Required | Default |
    /// |----------------------------------|----------|---------|
    /// | `DATABASE_URL`                   | **yes**  | --      |
    /// | `DATABASE_MAX_OPEN_CONNECTIONS`  | no       | `25`    |
    /// | `DATABASE_MIN_CONNECTIONS`       | no       | `0`     |
    /// | `DATABASE_MAX_IDLE_TIME_SECS`    | no       | `900`   |
    /// | `DATABASE_QUERY_TIMEOUT_SECS`    | no       | `3`     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let max_connections = parse_or(
            &lookup,
            "DATABASE_MAX_OPEN_CONNECTIONS",
            DEFAULT_MAX_OPEN_CONNECTIONS,
        )?;
        let min_connections = parse_or(
            &lookup,
            "DATABASE_MIN_CONNECTIONS",
            DEFAULT_MIN_CONNECTIONS,
        )?;
        let idle_secs = parse_or(
            &lookup,
            "DATABASE_MAX_IDLE_TIME_SECS",
            DEFAULT_MAX_IDLE_TIME_SECS,
        )?;
        let timeout_secs = parse_or(
            &lookup,
            "DATABASE_QUERY_TIMEOUT_SECS",
            DEFAULT_QUERY_TIMEOUT_SECS,
        )?;

        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DATABASE_MAX_OPEN_CONNECTIONS",
                value: "0".into(),
            });
        }
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "DATABASE_QUERY_TIMEOUT_SECS",
                value: "0".into(),
            });
        }

        Ok(Self {
            database_url,
            max_connections,
            // The floor cannot exceed what the pool may open.
            min_connections: min_connections.min(max_connections),
            idle_timeout: Duration::from_secs(idle_secs),
            query_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
