//! GraphQL output types.
//!
//! Thin wrappers over the domain models. Field names match the wire contract
//! clients rely on, so renames here are breaking changes.

use async_graphql::{Enum, ID, Object, SimpleObject};

use phonebook_core::PhoneFilter;

use crate::models;
use crate::services::rest::RestPerson;

/// Phone-presence filter for `allPersons`.
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum YesNo {
    Yes,
    No,
}

impl From<YesNo> for PhoneFilter {
    fn from(value: YesNo) -> Self {
        match value {
            YesNo::Yes => Self::Yes,
            YesNo::No => Self::No,
        }
    }
}

/// A contact's address, derived from the flat record.
#[derive(SimpleObject, Clone, Debug)]
pub struct Address {
    pub street: String,
    pub city: String,
}

/// A contact.
pub struct Person(pub models::Person);

#[Object]
impl Person {
    async fn name(&self) -> &str {
        self.0.name.as_str()
    }

    async fn phone(&self) -> Option<&str> {
        self.0.phone.as_ref().map(|p| p.as_str())
    }

    async fn address(&self) -> Address {
        Address {
            street: self.0.street.as_str().to_owned(),
            city: self.0.city.as_str().to_owned(),
        }
    }

    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }
}

impl From<models::Person> for Person {
    fn from(person: models::Person) -> Self {
        Self(person)
    }
}

/// An account and the contacts it has befriended.
pub struct User(pub models::User);

#[Object]
impl User {
    async fn username(&self) -> &str {
        self.0.username.as_str()
    }

    async fn friends(&self) -> Vec<Person> {
        self.0.friends.iter().cloned().map(Person).collect()
    }

    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }
}

impl From<models::User> for User {
    fn from(user: models::User) -> Self {
        Self(user)
    }
}

/// A signed identity token.
#[derive(SimpleObject, Clone, Debug)]
pub struct Token {
    pub value: String,
}

/// A person from the external REST service.
#[derive(SimpleObject, Clone, Debug)]
#[graphql(name = "PersonREST")]
pub struct PersonRest {
    pub name: String,
    pub id: ID,
    pub email: String,
}

impl From<RestPerson> for PersonRest {
    fn from(person: RestPerson) -> Self {
        Self {
            name: person.name,
            id: ID(person.id),
            email: person.email,
        }
    }
}
