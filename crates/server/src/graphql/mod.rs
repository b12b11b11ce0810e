//! GraphQL schema for the address book.
//!
//! - [`QueryRoot`]: `personCount`, `allPersons`, `findPerson`, `allPersonsREST`, `me`
//! - [`MutationRoot`]: `addPerson`, `editNumber`, `createUser`, `login`, `addAsFriend`
//! - [`SubscriptionRoot`]: `personAdded`
//!
//! The schema holds an [`AddressBook`] as data. Transports add a
//! [`CurrentUser`] to the per-request (or per-connection) data when the
//! caller presented a valid token.
//!
//! # Example
//!
//! ```graphql
//! mutation {
//!   addPerson(name: "Arto Hellas", street: "Tapiolankatu 5 A", city: "Espoo") {
//!     id
//!     address { street city }
//!   }
//! }
//! ```

mod mutation;
mod query;
mod subscription;
pub mod types;

pub use mutation::MutationRoot;
pub use query::QueryRoot;
pub use subscription::SubscriptionRoot;

use async_graphql::{Context, Schema};

use crate::middleware::auth::CurrentUser;
use crate::models::User;
use crate::services::AddressBook;

/// The full schema type served at `/graphql`.
pub type PhonebookSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

/// Build the schema around `book`.
#[must_use]
pub fn build_schema(book: AddressBook) -> PhonebookSchema {
    Schema::build(QueryRoot, MutationRoot, SubscriptionRoot)
        .data(book)
        .finish()
}

fn address_book<'ctx>(ctx: &Context<'ctx>) -> async_graphql::Result<&'ctx AddressBook> {
    ctx.data::<AddressBook>()
}

fn current_user<'ctx>(ctx: &Context<'ctx>) -> Option<&'ctx User> {
    ctx.data_opt::<CurrentUser>().map(|current| &current.0)
}
