//! `PostgreSQL` user store.
//!
//! A user's friends are stored in `phonebook.user_friend` with an explicit
//! position so the list keeps the order in which friends were added.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use phonebook_core::{PersonId, UserId, Username};

use super::persons::PersonRow;
use super::{RepositoryError, UserStore, map_write_error};
use crate::models::{Person, User};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: Username,
}

/// User store backed by `phonebook.user` and `phonebook.user_friend`.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new user store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn friends_of(&self, user_id: UserId) -> Result<Vec<Person>, RepositoryError> {
        let rows = sqlx::query_as::<_, PersonRow>(
            r"
            SELECT p.id, p.name, p.phone, p.street, p.city
            FROM phonebook.user_friend f
            JOIN phonebook.person p ON p.id = f.person_id
            WHERE f.user_id = $1
            ORDER BY f.position
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Person::from).collect())
    }

    async fn populate(&self, row: Option<UserRow>) -> Result<Option<User>, RepositoryError> {
        let Some(row) = row else {
            return Ok(None);
        };

        let friends = self.friends_of(row.id).await?;
        Ok(Some(User {
            id: row.id,
            username: row.username,
            friends,
        }))
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self, username), fields(username = %username))]
    async fn create(&self, username: &Username) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO phonebook.user (username)
            VALUES ($1)
            RETURNING id, username
            ",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "username must be unique"))?;

        debug!(id = %row.id, "Inserted user");
        Ok(User {
            id: row.id,
            username: row.username,
            friends: Vec::new(),
        })
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username
            FROM phonebook.user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        self.populate(row).await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username
            FROM phonebook.user
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        self.populate(row).await
    }

    #[instrument(skip(self))]
    async fn append_friend(&self, id: UserId, person: PersonId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Serializes appends per user so positions stay dense and unique.
        let locked = sqlx::query("SELECT id FROM phonebook.user WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let inserted = sqlx::query(
            r"
            INSERT INTO phonebook.user_friend (user_id, person_id, position)
            SELECT $1, $2, COALESCE(MAX(position) + 1, 0)
            FROM phonebook.user_friend
            WHERE user_id = $1
            ON CONFLICT (user_id, person_id) DO NOTHING
            ",
        )
        .bind(id)
        .bind(person)
        .execute(&mut *tx)
        .await
        .map_err(map_append_error)?
        .rows_affected();

        tx.commit().await?;

        debug!(inserted, "Appended friend");
        Ok(inserted > 0)
    }
}

/// A missing contact is `NotFound`; anything else is a store failure, never
/// the caller's fault.
fn map_append_error(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            RepositoryError::NotFound
        }
        err => RepositoryError::Database(err),
    }
}
