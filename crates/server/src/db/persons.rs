//! `PostgreSQL` contact store.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use phonebook_core::{City, PersonId, PersonName, Phone, PhoneFilter, Street};

use super::{PersonStore, RepositoryError, map_write_error};
use crate::models::{NewPerson, Person};

/// Row shape of `phonebook.person`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PersonRow {
    pub id: PersonId,
    pub name: PersonName,
    pub phone: Option<Phone>,
    pub street: Street,
    pub city: City,
}

impl From<PersonRow> for Person {
    fn from(row: PersonRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            phone: row.phone,
            street: row.street,
            city: row.city,
        }
    }
}

/// Contact store backed by `phonebook.person`.
#[derive(Clone)]
pub struct PgPersonStore {
    pool: PgPool,
}

impl PgPersonStore {
    /// Create a new contact store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersonStore for PgPersonStore {
    async fn count(&self) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM phonebook.person")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: Option<PhoneFilter>) -> Result<Vec<Person>, RepositoryError> {
        let sql = match filter {
            None => {
                r"
                SELECT id, name, phone, street, city
                FROM phonebook.person
                ORDER BY id
                "
            }
            Some(PhoneFilter::Yes) => {
                r"
                SELECT id, name, phone, street, city
                FROM phonebook.person
                WHERE phone IS NOT NULL
                ORDER BY id
                "
            }
            Some(PhoneFilter::No) => {
                r"
                SELECT id, name, phone, street, city
                FROM phonebook.person
                WHERE phone IS NULL
                ORDER BY id
                "
            }
        };

        let rows = sqlx::query_as::<_, PersonRow>(sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Person::from).collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Person>, RepositoryError> {
        let row = sqlx::query_as::<_, PersonRow>(
            r"
            SELECT id, name, phone, street, city
            FROM phonebook.person
            WHERE name = $1
            ",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Person::from))
    }

    #[instrument(skip(self, person), fields(name = %person.name))]
    async fn create(&self, person: NewPerson) -> Result<Person, RepositoryError> {
        let row: (PersonId,) = sqlx::query_as(
            r"
            INSERT INTO phonebook.person (name, phone, street, city)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&person.name)
        .bind(&person.phone)
        .bind(&person.street)
        .bind(&person.city)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "name must be unique"))?;

        debug!(id = %row.0, "Inserted person");
        Ok(person.into_person(row.0))
    }

    #[instrument(skip(self, phone))]
    async fn update_phone(&self, id: PersonId, phone: &Phone) -> Result<Person, RepositoryError> {
        let row = sqlx::query_as::<_, PersonRow>(
            r"
            UPDATE phonebook.person
            SET phone = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, name, phone, street, city
            ",
        )
        .bind(phone)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "name must be unique"))?;

        row.map(Person::from).ok_or(RepositoryError::NotFound)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
