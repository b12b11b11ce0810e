//! Business logic services.

pub mod address_book;
pub mod auth;
pub mod events;
pub mod rest;

pub use address_book::{AddPerson, AddressBook};
