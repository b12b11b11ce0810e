//! Core types for Phonebook.
//!
//! This module provides type-safe wrappers for the address book's domain
//! concepts.

pub mod filter;
pub mod id;
pub mod text;

pub use filter::PhoneFilter;
pub use id::*;
pub use text::{City, PersonName, Phone, Street, TextError, Username};
