use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Store-layer failures. Both variants reach the client as the same 500; the split
/// only matters for logs.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Store unreachable: pool exhausted or closed, socket or TLS failure.
    #[error("{0}")]
    Connection(String),

    /// Statement rejected: syntax, constraint violation, decode failure.
    #[error("{0}")]
    Query(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => DatabaseError::Connection(err.to_string()),
            other => DatabaseError::Query(other.to_string()),
        }
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Builds the shared Postgres pool from explicit configuration.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Create the pool without opening a connection; the first request (or the startup
    /// schema check) connects. A database that is down at boot therefore surfaces as
    /// per-request 500s and a degraded `/health`, not a crash.
    pub fn pool(config: &DatabaseConfig) -> DatabaseResult<PgPool> {
        let options = Self::connect_options(config)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy_with(options);

        info!("Created database pool for: {}", config.redacted_url());
        Ok(pool)
    }

    fn connect_options(config: &DatabaseConfig) -> DatabaseResult<PgConnectOptions> {
        match &config.url {
            Some(url) => PgConnectOptions::from_str(url)
                .map_err(|e| DatabaseError::Connection(format!("invalid DATABASE_URL: {}", e))),
            None => Ok(PgConnectOptions::new()
                .host(&config.host)
                .port(config.port)
                .database(&config.name)
                .username(&config.user)
                .password(&config.password)),
        }
    }
}
