//! Contact domain types.

use phonebook_core::{City, PersonId, PersonName, Phone, Street};

/// A stored contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    /// Identifier assigned by the store at creation.
    pub id: PersonId,
    /// Unique display name.
    pub name: PersonName,
    /// Phone number, if known.
    pub phone: Option<Phone>,
    /// Street address.
    pub street: Street,
    /// City.
    pub city: City,
}

/// A contact that has been validated but not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub name: PersonName,
    pub phone: Option<Phone>,
    pub street: Street,
    pub city: City,
}

impl NewPerson {
    /// Attach the identifier assigned by the store.
    #[must_use]
    pub fn into_person(self, id: PersonId) -> Person {
        Person {
            id,
            name: self.name,
            phone: self.phone,
            street: self.street,
            city: self.city,
        }
    }
}
