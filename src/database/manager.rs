use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use super::memory::MemoryStore;
use super::postgres::PgStore;
use super::store::Store;
use crate::config::DatabaseConfig;
use crate::ledger::LedgerError;

/// Errors from the store layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Which backend a DATABASE_URL selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Postgres(String),
    Memory,
}

/// Opens the configured store and prepares its schema
pub struct DatabaseManager;

impl DatabaseManager {
    const SCHEMA: &'static [&'static str] = &[
        r#"CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
        r#"CREATE TABLE IF NOT EXISTS categories (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            image TEXT NOT NULL
        )"#,
        r#"CREATE TABLE IF NOT EXISTS user_cards (
            id UUID PRIMARY KEY,
            owner_user_id UUID NOT NULL REFERENCES users(id),
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            image TEXT NOT NULL,
            UNIQUE (owner_user_id, name)
        )"#,
        r#"CREATE TABLE IF NOT EXISTS budgets (
            owner_user_id UUID PRIMARY KEY REFERENCES users(id),
            entries JSONB NOT NULL DEFAULT '[]'::jsonb,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
        r#"CREATE TABLE IF NOT EXISTS feedback (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id),
            username TEXT NOT NULL,
            message TEXT NOT NULL,
            rating SMALLINT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
    ];

    /// Open the store named by `config.url` and make sure its schema exists
    pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Store>, DatabaseError> {
        match Self::store_kind(&config.url)? {
            StoreKind::Memory => {
                info!("Using in-memory store; data is lost on restart");
                Ok(Arc::new(MemoryStore::new()))
            }
            StoreKind::Postgres(url) => {
                let pool = Self::pg_pool(&url, config).await?;
                Self::bootstrap(&pool).await?;
                info!("Connected to PostgreSQL store");
                Ok(Arc::new(PgStore::new(pool)))
            }
        }
    }

    async fn pg_pool(url: &str, config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;
        Ok(pool)
    }

    /// Create tables that do not exist yet
    pub async fn bootstrap(pool: &PgPool) -> Result<(), DatabaseError> {
        for statement in Self::SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        Ok(())
    }

    /// Classify a DATABASE_URL. `memory://` selects the in-process store.
    pub fn store_kind(raw: &str) -> Result<StoreKind, DatabaseError> {
        if raw.trim().is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl(Self::redact(raw)))?;
        match url.scheme() {
            "memory" => Ok(StoreKind::Memory),
            "postgres" | "postgresql" => Ok(StoreKind::Postgres(raw.to_string())),
            other => Err(DatabaseError::InvalidDatabaseUrl(format!("unsupported scheme '{}'", other))),
        }
    }

    /// Drop credentials before a URL ends up in an error message
    fn redact(raw: &str) -> String {
        match raw.split_once('@') {
            Some((_, host)) => format!("***@{}", host),
            None => raw.to_string(),
        }
    }
}
