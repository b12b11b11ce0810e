//! Write operations.

use async_graphql::{Context, ErrorExtensions, Object, Result};

use crate::services::AddPerson;

use super::types::{Person, Token, User};
use super::{address_book, current_user};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Add a contact and befriend it. Requires a signed-in user.
    async fn add_person(
        &self,
        ctx: &Context<'_>,
        name: String,
        phone: Option<String>,
        street: String,
        city: String,
    ) -> Result<Option<Person>> {
        let input = AddPerson {
            name,
            phone,
            street,
            city,
        };
        let person = address_book(ctx)?
            .add_person(current_user(ctx), input)
            .await
            .map_err(|e| e.extend())?;
        Ok(Some(Person(person)))
    }

    /// Change a contact's phone number. Null if no contact has that name.
    async fn edit_number(
        &self,
        ctx: &Context<'_>,
        name: String,
        phone: String,
    ) -> Result<Option<Person>> {
        let person = address_book(ctx)?
            .edit_number(&name, &phone)
            .await
            .map_err(|e| e.extend())?;
        Ok(person.map(Person))
    }

    async fn create_user(&self, ctx: &Context<'_>, username: String) -> Result<Option<User>> {
        let user = address_book(ctx)?
            .create_user(&username)
            .await
            .map_err(|e| e.extend())?;
        Ok(Some(User(user)))
    }

    async fn login(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> Result<Option<Token>> {
        let value = address_book(ctx)?
            .login(&username, &password)
            .await
            .map_err(|e| e.extend())?;
        Ok(Some(Token { value }))
    }

    /// Befriend an existing contact. Requires a signed-in user.
    async fn add_as_friend(&self, ctx: &Context<'_>, name: String) -> Result<Option<User>> {
        let user = address_book(ctx)?
            .add_as_friend(current_user(ctx), &name)
            .await
            .map_err(|e| e.extend())?;
        Ok(Some(User(user)))
    }
}
