//! Domain models for the address book.
//!
//! These types represent validated domain objects, separate from database row
//! types and from the GraphQL output types in [`crate::graphql::types`].

pub mod person;
pub mod user;

pub use person::{NewPerson, Person};
pub use user::User;
