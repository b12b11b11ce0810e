//! Persistence for contacts and users.
//!
//! # Database: `phonebook`
//!
//! ## Tables
//!
//! - `phonebook.person` - Contacts (unique name, optional phone, address)
//! - `phonebook.user` - Accounts (unique username, no password)
//! - `phonebook.user_friend` - Ordered friends list of each user
//!
//! # Stores
//!
//! Resolvers only see the [`PersonStore`] and [`UserStore`] traits. The
//! `PostgreSQL` implementations live in [`persons`] and [`users`]; the
//! in-memory implementation in [`memory`] backs tests and
//! `PHONEBOOK_STORE=memory` runs.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p phonebook-cli -- migrate
//! ```

pub mod memory;
pub mod persons;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use phonebook_core::{PersonId, Phone, PhoneFilter, UserId, Username};

use crate::models::{NewPerson, Person, User};

pub use memory::MemoryStore;
pub use persons::PgPersonStore;
pub use users::PgUserStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique name).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A stored value failed a validation rule.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl RepositoryError {
    /// Whether the error was caused by the caller's input rather than the store.
    #[must_use]
    pub const fn is_user_input(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::Validation(_))
    }
}

/// Map constraint violations on write to the matching repository error.
pub(crate) fn map_write_error(err: sqlx::Error, conflict: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(conflict.to_owned());
        }
        if db_err.is_check_violation() {
            return RepositoryError::Validation(db_err.message().to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::NotFound;
        }
    }
    RepositoryError::Database(err)
}

/// Contact persistence.
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// Number of stored contacts.
    async fn count(&self) -> Result<i64, RepositoryError>;

    /// All contacts in creation order, optionally filtered on phone presence.
    async fn list(&self, filter: Option<PhoneFilter>) -> Result<Vec<Person>, RepositoryError>;

    /// Exact-match lookup by name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Person>, RepositoryError>;

    /// Store a new contact and return it with its assigned id.
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    async fn create(&self, person: NewPerson) -> Result<Person, RepositoryError>;

    /// Replace a contact's phone number.
    ///
    /// Returns `RepositoryError::NotFound` if the contact doesn't exist.
    async fn update_phone(&self, id: PersonId, phone: &Phone) -> Result<Person, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Account persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Store a new user with an empty friends list.
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    async fn create(&self, username: &Username) -> Result<User, RepositoryError>;

    /// Lookup by id, with friends populated.
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Lookup by username, with friends populated.
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// Append `person` to the end of the user's friends list unless it is
    /// already there. Returns whether the list changed.
    ///
    /// Concurrent appends for the same user must all land, each at its own
    /// position.
    ///
    /// Returns `RepositoryError::NotFound` if the user or the contact doesn't exist.
    async fn append_friend(&self, id: UserId, person: PersonId) -> Result<bool, RepositoryError>;
}

/// The store handles shared by every request.
#[derive(Clone)]
pub struct Stores {
    pub persons: Arc<dyn PersonStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    /// Stores backed by a `PostgreSQL` pool.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            persons: Arc::new(PgPersonStore::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool)),
        }
    }

    /// Stores backed by a single process-local [`MemoryStore`].
    #[must_use]
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            persons: store.clone(),
            users: store,
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the embedded migrations against `pool`.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
