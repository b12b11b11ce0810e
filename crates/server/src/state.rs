//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::Stores;
use crate::graphql::{PhonebookSchema, build_schema};
use crate::services::AddressBook;
use crate::services::auth::TokenService;
use crate::services::events::EventBus;
use crate::services::rest::{RestClient, RestError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The schema and the handlers share the same
/// [`AddressBook`], so tokens issued over HTTP authenticate WebSocket
/// connections and every subscriber sees every mutation.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    book: AddressBook,
    schema: PhonebookSchema,
}

impl AppState {
    /// Wire the address book and schema from configuration and stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the REST client cannot be built.
    pub fn new(config: &ServerConfig, stores: Stores) -> Result<Self, RestError> {
        let book = AddressBook::new(
            stores,
            TokenService::new(&config.jwt_secret),
            EventBus::new(config.event_capacity),
            RestClient::new(config.rest_base_url.clone())?,
            config.login_password.clone(),
        );
        Ok(Self::from_book(book))
    }

    /// State around an already assembled address book.
    #[must_use]
    pub fn from_book(book: AddressBook) -> Self {
        let schema = build_schema(book.clone());
        Self {
            inner: Arc::new(AppStateInner { book, schema }),
        }
    }

    /// Get a reference to the address book.
    #[must_use]
    pub fn book(&self) -> &AddressBook {
        &self.inner.book
    }

    /// Get a reference to the GraphQL schema.
    #[must_use]
    pub fn schema(&self) -> &PhonebookSchema {
        &self.inner.schema
    }
}
