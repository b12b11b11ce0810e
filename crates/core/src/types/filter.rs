//! Contact list filters.

use serde::{Deserialize, Serialize};

/// Filter on whether a contact has a phone number.
///
/// Mirrors the `YesNo` enum of the GraphQL schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhoneFilter {
    /// Only contacts with a phone number.
    Yes,
    /// Only contacts without a phone number.
    No,
}

impl PhoneFilter {
    /// Whether a contact with the given phone presence passes the filter.
    #[must_use]
    pub const fn matches(self, has_phone: bool) -> bool {
        match self {
            Self::Yes => has_phone,
            Self::No => !has_phone,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_matches() {
        assert!(PhoneFilter::Yes.matches(true));
        assert!(!PhoneFilter::Yes.matches(false));
        assert!(PhoneFilter::No.matches(false));
        assert!(!PhoneFilter::No.matches(true));
    }

    #[test]
    fn test_serde_uses_schema_names() {
        assert_eq!(serde_json::to_string(&PhoneFilter::Yes).unwrap(), "\"YES\"");
        let parsed: PhoneFilter = serde_json::from_str("\"NO\"").unwrap();
        assert_eq!(parsed, PhoneFilter::No);
    }
}
