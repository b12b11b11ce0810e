//! Read operations.

use async_graphql::{Context, ErrorExtensions, Object, Result};

use super::types::{Person, PersonRest, User, YesNo};
use super::{address_book, current_user};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Number of stored contacts.
    async fn person_count(&self, ctx: &Context<'_>) -> Result<i64> {
        address_book(ctx)?
            .person_count()
            .await
            .map_err(|e| e.extend())
    }

    /// All contacts, or only those with (`YES`) or without (`NO`) a phone.
    async fn all_persons(&self, ctx: &Context<'_>, phone: Option<YesNo>) -> Result<Vec<Person>> {
        let persons = address_book(ctx)?
            .all_persons(phone.map(Into::into))
            .await
            .map_err(|e| e.extend())?;
        Ok(persons.into_iter().map(Person).collect())
    }

    /// The contact with exactly this name.
    async fn find_person(&self, ctx: &Context<'_>, name: String) -> Result<Option<Person>> {
        let person = address_book(ctx)?
            .find_person(&name)
            .await
            .map_err(|e| e.extend())?;
        Ok(person.map(Person))
    }

    /// Persons listed by the external REST service.
    #[graphql(name = "allPersonsREST")]
    async fn all_persons_rest(&self, ctx: &Context<'_>) -> Result<Vec<PersonRest>> {
        let persons = address_book(ctx)?
            .all_persons_rest()
            .await
            .map_err(|e| e.extend())?;
        Ok(persons.into_iter().map(PersonRest::from).collect())
    }

    /// The signed-in user.
    async fn me(&self, ctx: &Context<'_>) -> Option<User> {
        current_user(ctx).cloned().map(User)
    }
}
