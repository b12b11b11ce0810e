//! Address book operations behind the GraphQL schema.
//!
//! [`AddressBook`] owns every collaborator a resolver needs (stores, token
//! service, event bus, REST client) so the schema layer is a thin mapping
//! from fields to these methods. Authentication is checked here, before any
//! side effect, from the `current` user the transport resolved.

use futures::Stream;
use secrecy::SecretString;
use tracing::{info, instrument};

use phonebook_core::{City, PersonName, Phone, PhoneFilter, Street, Username};

use crate::db::{RepositoryError, Stores};
use crate::error::{AppError, Result};
use crate::models::{NewPerson, Person, User};
use crate::services::auth::{self, Claims, TokenError, TokenService};
use crate::services::events::EventBus;
use crate::services::rest::{RestClient, RestPerson};

/// Raw `addPerson` arguments, validated by [`AddressBook::add_person`].
#[derive(Debug, Clone)]
pub struct AddPerson {
    pub name: String,
    pub phone: Option<String>,
    pub street: String,
    pub city: String,
}

impl AddPerson {
    fn validate(self) -> Result<NewPerson> {
        Ok(NewPerson {
            name: PersonName::parse(&self.name)?,
            phone: self.phone.as_deref().map(Phone::parse).transpose()?,
            street: Street::parse(&self.street)?,
            city: City::parse(&self.city)?,
        })
    }
}

/// Contact and user operations shared by every transport.
#[derive(Clone)]
pub struct AddressBook {
    stores: Stores,
    tokens: TokenService,
    events: EventBus,
    rest: RestClient,
    login_password: SecretString,
}

impl AddressBook {
    /// Assemble the address book from its collaborators.
    #[must_use]
    pub const fn new(
        stores: Stores,
        tokens: TokenService,
        events: EventBus,
        rest: RestClient,
        login_password: SecretString,
    ) -> Self {
        Self {
            stores,
            tokens,
            events,
            rest,
            login_password,
        }
    }

    /// The underlying stores.
    #[must_use]
    pub const fn stores(&self) -> &Stores {
        &self.stores
    }

    /// The event bus `personAdded` is published on.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Number of stored contacts.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    pub async fn person_count(&self) -> Result<i64> {
        Ok(self.stores.persons.count().await?)
    }

    /// All contacts, optionally filtered on whether they have a phone.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    pub async fn all_persons(&self, filter: Option<PhoneFilter>) -> Result<Vec<Person>> {
        Ok(self.stores.persons.list(filter).await?)
    }

    /// Contact with exactly this name, if any.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    pub async fn find_person(&self, name: &str) -> Result<Option<Person>> {
        Ok(self.stores.persons.find_by_name(name).await?)
    }

    /// Persons listed by the external REST service.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the service cannot be reached or answers
    /// with something other than a list of persons.
    pub async fn all_persons_rest(&self) -> Result<Vec<RestPerson>> {
        Ok(self.rest.list_persons().await?)
    }

    /// Add a contact and make it a friend of `current`.
    ///
    /// The contact is stored first, then appended to the user's friends, then
    /// published to `personAdded` subscribers.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthenticated` without touching the store if
    /// `current` is `None`, and `BadUserInput` for invalid or duplicate input.
    #[instrument(skip(self, current, input), fields(name = %input.name))]
    pub async fn add_person(&self, current: Option<&User>, input: AddPerson) -> Result<Person> {
        let current = current.ok_or(AppError::Unauthenticated)?;
        let new_person = input.validate()?;

        let person = self.stores.persons.create(new_person).await?;

        self.stores.users.append_friend(current.id, person.id).await?;

        let subscribers = self.events.publish_person_added(person.clone());
        info!(id = %person.id, user = %current.id, subscribers, "Added person");
        Ok(person)
    }

    /// Set the phone number of the contact called `name`.
    ///
    /// Returns `None` and changes nothing when there is no such contact.
    ///
    /// # Errors
    ///
    /// Returns `BadUserInput` if `phone` is too short.
    #[instrument(skip(self, phone))]
    pub async fn edit_number(&self, name: &str, phone: &str) -> Result<Option<Person>> {
        let Some(person) = self.stores.persons.find_by_name(name).await? else {
            return Ok(None);
        };

        let phone = Phone::parse(phone)?;
        let updated = self.stores.persons.update_phone(person.id, &phone).await?;
        info!(id = %updated.id, "Updated phone number");
        Ok(Some(updated))
    }

    /// Create a user with an empty friends list.
    ///
    /// # Errors
    ///
    /// Returns `BadUserInput` if the username is too short or taken.
    #[instrument(skip(self))]
    pub async fn create_user(&self, username: &str) -> Result<User> {
        let username = Username::parse(username)?;
        let user = self.stores.users.create(&username).await?;
        info!(id = %user.id, "Created user");
        Ok(user)
    }

    /// Exchange a username and the shared password for a token.
    ///
    /// # Errors
    ///
    /// Returns `AppError::WrongCredentials` if the user doesn't exist or the
    /// password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let user = self.stores.users.get_by_username(username).await?;
        let user = match user {
            Some(user) if auth::password_matches(&self.login_password, password) => user,
            _ => return Err(AppError::WrongCredentials),
        };

        self.issue_token(&user)
    }

    /// Sign a token for `user`.
    ///
    /// # Errors
    ///
    /// Returns error if signing fails.
    pub fn issue_token(&self, user: &User) -> Result<String> {
        self.tokens
            .issue(&Claims::for_user(user))
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Make the contact called `name` a friend of `current`, once.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthenticated` if `current` is `None` and
    /// `AppError::NotFound` if there is no contact with that name.
    #[instrument(skip(self, current))]
    pub async fn add_as_friend(&self, current: Option<&User>, name: &str) -> Result<User> {
        let current = current.ok_or(AppError::Unauthenticated)?;

        let person = self
            .stores
            .persons
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("person {name}")))?;

        if self.stores.users.append_friend(current.id, person.id).await? {
            info!(user = %current.id, "Added friend");
        }

        self.fresh(current).await
    }

    /// Resolve an `Authorization` header value to the user it identifies.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidToken` if the value is not a bearer token, the
    /// token fails verification, or its user no longer exists.
    pub async fn authenticate(&self, authorization: &str) -> Result<User> {
        let token = auth::bearer_token(authorization)?;
        let claims = self.tokens.verify(token)?;

        self.stores
            .users
            .get_by_id(claims.id)
            .await?
            .ok_or(AppError::InvalidToken(TokenError::UnknownSubject))
    }

    /// Contacts added from now on.
    pub fn person_added(&self) -> impl Stream<Item = Person> + Send + 'static {
        self.events.person_added()
    }

    /// Check that the backing store answers.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    pub async fn ping(&self) -> Result<()> {
        Ok(self.stores.persons.ping().await?)
    }

    /// Reload `user` so friend updates start from the stored list.
    async fn fresh(&self, user: &User) -> Result<User> {
        match self.stores.users.get_by_id(user.id).await? {
            Some(user) => Ok(user),
            None => Err(RepositoryError::NotFound.into()),
        }
    }
}
