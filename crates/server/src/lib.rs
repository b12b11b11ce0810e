//! Phonebook server library.
//!
//! A GraphQL address book: contacts with an optional phone number, users who
//! befriend contacts, bearer-token authentication and a `personAdded`
//! subscription. The crate is a library so the binary, the CLI and the
//! integration tests share one router and one set of stores.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
