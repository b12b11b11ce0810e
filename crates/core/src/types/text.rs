//! Validated text fields for contacts and users.
//!
//! Every stored string in the address book has a minimum length. The rules
//! are checked when the value is parsed, so a `PersonName` or `Username` that
//! exists is always valid. The database repeats the same rules as CHECK
//! constraints.

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a validated text field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    /// The input string is empty.
    #[error("`{field}` is required")]
    Empty {
        /// Name of the field being validated.
        field: &'static str,
    },
    /// The input string is shorter than the field allows.
    #[error("`{field}` ({value}) is shorter than the minimum allowed length ({min})")]
    TooShort {
        /// Name of the field being validated.
        field: &'static str,
        /// The rejected value.
        value: String,
        /// Minimum allowed length in characters.
        min: usize,
    },
}

impl TextError {
    /// Name of the field that failed validation.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::TooShort { field, .. } => field,
        }
    }
}

/// Macro to define a validated text newtype.
///
/// Creates a newtype wrapper around `String` with:
/// - `parse()` enforcing a minimum length in characters
/// - `as_str()`, `into_inner()`, `Display`, `FromStr`, `AsRef<str>`
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
macro_rules! define_text {
    ($(#[$meta:meta])* $name:ident, field = $field:literal, min = $min:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Field name used in validation messages.
            pub const FIELD: &'static str = $field;

            /// Minimum length in characters.
            pub const MIN_LENGTH: usize = $min;

            /// Parse a value, enforcing the minimum length.
            ///
            /// # Errors
            ///
            /// Returns `TextError::Empty` for an empty string and
            /// `TextError::TooShort` when the value has fewer than
            /// `MIN_LENGTH` characters.
            pub fn parse(s: &str) -> Result<Self, TextError> {
                if s.is_empty() {
                    return Err(TextError::Empty { field: Self::FIELD });
                }

                if s.chars().count() < Self::MIN_LENGTH {
                    return Err(TextError::TooShort {
                        field: Self::FIELD,
                        value: s.to_owned(),
                        min: Self::MIN_LENGTH,
                    });
                }

                Ok(Self(s.to_owned()))
            }

            /// Returns the value as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the value and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = TextError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                // CHECK constraints keep stored values valid
                Ok(Self(s))
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_text!(
    /// A contact's display name. Unique across the address book.
    PersonName,
    field = "name",
    min = 5
);

define_text!(
    /// A contact's phone number. Optional on the contact itself.
    Phone,
    field = "phone",
    min = 5
);

define_text!(
    /// Street part of a contact's address.
    Street,
    field = "street",
    min = 5
);

define_text!(
    /// City part of a contact's address.
    City,
    field = "city",
    min = 5
);

define_text!(
    /// An account's login name. Unique across users.
    Username,
    field = "username",
    min = 3
);
