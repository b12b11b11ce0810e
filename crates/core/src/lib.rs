//! Phonebook Core - Shared domain types.
//!
//! This crate provides the types shared by every Phonebook component:
//! - `server` - GraphQL service (HTTP + WebSocket)
//! - `cli` - Command-line tools for migrations and user management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Validation rules for contacts and users live here so the
//! server, the stores and the CLI all agree on them.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, validated text fields and the phone filter

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
