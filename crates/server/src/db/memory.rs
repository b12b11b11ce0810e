//! In-memory implementation of both stores.
//!
//! Holds contacts and users behind one lock so user lookups can populate
//! friends the same way the `PostgreSQL` join does. Enforces the same
//! uniqueness rules as the database constraints.

use async_trait::async_trait;
use tokio::sync::RwLock;

use phonebook_core::{PersonId, Phone, PhoneFilter, UserId, Username};

use super::{PersonStore, RepositoryError, UserStore};
use crate::models::{NewPerson, Person, User};

#[derive(Debug)]
struct StoredUser {
    id: UserId,
    username: Username,
    friends: Vec<PersonId>,
}

#[derive(Debug, Default)]
struct Inner {
    persons: Vec<Person>,
    users: Vec<StoredUser>,
    next_person_id: i32,
    next_user_id: i32,
}

impl Inner {
    fn person(&self, id: PersonId) -> Option<&Person> {
        self.persons.iter().find(|p| p.id == id)
    }

    fn populate(&self, user: &StoredUser) -> User {
        User {
            id: user.id,
            username: user.username.clone(),
            friends: user
                .friends
                .iter()
                .filter_map(|id| self.person(*id).cloned())
                .collect(),
        }
    }
}

/// Process-local contact and user store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonStore for MemoryStore {
    async fn count(&self) -> Result<i64, RepositoryError> {
        let inner = self.inner.read().await;
        i64::try_from(inner.persons.len())
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))
    }

    async fn list(&self, filter: Option<PhoneFilter>) -> Result<Vec<Person>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .persons
            .iter()
            .filter(|p| filter.is_none_or(|f| f.matches(p.phone.is_some())))
            .cloned()
            .collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Person>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .persons
            .iter()
            .find(|p| p.name.as_str() == name)
            .cloned())
    }

    async fn create(&self, person: NewPerson) -> Result<Person, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.persons.iter().any(|p| p.name == person.name) {
            return Err(RepositoryError::Conflict("name must be unique".to_owned()));
        }

        inner.next_person_id += 1;
        let person = person.into_person(PersonId::new(inner.next_person_id));
        inner.persons.push(person.clone());
        Ok(person)
    }

    async fn update_phone(&self, id: PersonId, phone: &Phone) -> Result<Person, RepositoryError> {
        let mut inner = self.inner.write().await;
        let person = inner
            .persons
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;

        person.phone = Some(phone.clone());
        Ok(person.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, username: &Username) -> Result<User, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| &u.username == username) {
            return Err(RepositoryError::Conflict(
                "username must be unique".to_owned(),
            ));
        }

        inner.next_user_id += 1;
        let user = StoredUser {
            id: UserId::new(inner.next_user_id),
            username: username.clone(),
            friends: Vec::new(),
        };
        let populated = inner.populate(&user);
        inner.users.push(user);
        Ok(populated)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .find(|u| u.id == id)
            .map(|u| inner.populate(u)))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .find(|u| u.username.as_str() == username)
            .map(|u| inner.populate(u)))
    }

    async fn append_friend(&self, id: UserId, person: PersonId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.person(person).is_none() {
            return Err(RepositoryError::NotFound);
        }

        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if user.friends.contains(&person) {
            return Ok(false);
        }
        user.friends.push(person);
        Ok(true)
    }
}
