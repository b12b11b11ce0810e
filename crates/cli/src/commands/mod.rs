//! Command implementations.

pub mod migrate;
pub mod token;
pub mod user;

use phonebook_core::TextError;
use phonebook_server::config::{ConfigError, ServerConfig, StoreConfig};
use phonebook_server::db::{self, RepositoryError, Stores};
use phonebook_server::services::auth::TokenError;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The command needs `PostgreSQL` but the memory store is configured.
    #[error("PHONEBOOK_STORE=memory has no persistent database to operate on")]
    MemoryStore,

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Store operation failed.
    #[error("Store error: {0}")]
    Repository(#[from] RepositoryError),

    /// Argument failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] TextError),

    /// Token could not be signed.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// No user has that username.
    #[error("User not found: {0}")]
    UserNotFound(String),
}

/// Load configuration and connect to the configured database.
async fn connect() -> Result<(ServerConfig, PgPool), CliError> {
    let config = ServerConfig::from_env()?;
    let StoreConfig::Postgres { database_url } = &config.store else {
        return Err(CliError::MemoryStore);
    };

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(database_url).await?;
    Ok((config, pool))
}

/// Postgres-backed stores plus the configuration they were built from.
async fn stores() -> Result<(ServerConfig, Stores), CliError> {
    let (config, pool) = connect().await?;
    Ok((config, Stores::postgres(pool)))
}
