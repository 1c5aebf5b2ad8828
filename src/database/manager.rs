use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Database unavailable: {0}")]
    Connection(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Not-null constraint violated: {0}")]
    NotNullViolation(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some("23505") => return DatabaseError::UniqueViolation(db_err.message().to_string()),
                Some("23502") => return DatabaseError::NotNullViolation(db_err.message().to_string()),
                Some(code) if is_invalid_value(code) => {
                    return DatabaseError::InvalidValue(db_err.message().to_string())
                }
                _ => {}
            }
        }
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::Connection(err.to_string())
            }
            other => DatabaseError::Sqlx(other),
        }
    }
}

/// SQLSTATEs raised when Postgres rejects a bound value: numeric out of
/// range, invalid byte sequence, invalid text representation, datetime
/// format and datetime overflow.
fn is_invalid_value(code: &str) -> bool {
    matches!(code, "22003" | "22021" | "22P02" | "22007" | "22008")
}

/// Connection pool construction for the single application database
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool using `DATABASE_URL` (or the configured url override).
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = Self::database_url(config)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&url)
            .await?;

        info!(
            "Created database pool (max_connections={})",
            config.max_connections
        );
        Ok(pool)
    }

    fn database_url(config: &DatabaseConfig) -> Result<String, DatabaseError> {
        config
            .url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))
    }
}
