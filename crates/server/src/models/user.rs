//! User domain types.

use phonebook_core::{PersonId, UserId, Username};

use super::Person;

/// An account with its friends list populated.
///
/// Friends are references: the user does not own the contacts' lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Identifier assigned by the store at creation.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    /// Friends in the order they were added.
    pub friends: Vec<Person>,
}

impl User {
    /// Identifiers of all friends, in order.
    #[must_use]
    pub fn friend_ids(&self) -> Vec<PersonId> {
        self.friends.iter().map(|f| f.id).collect()
    }
}
