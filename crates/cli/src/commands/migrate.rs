//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! pb-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `PHONEBOOK_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `PHONEBOOK_JWT_SECRET` - validated with the rest of the configuration
//!
//! Migrations live in `crates/server/migrations/` and are embedded at build time.

use phonebook_server::db;

use super::{CliError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let (_, pool) = connect().await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
