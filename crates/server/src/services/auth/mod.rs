//! Identity tokens.
//!
//! Tokens are HS256 JWTs carrying the user's name and id plus the issue time.
//! No expiry is set: a token stays valid for as long as the signing secret
//! does. Verification is delegated to `jsonwebtoken`.

mod error;

pub use error::TokenError;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use phonebook_core::UserId;

use crate::models::User;

/// Scheme prefix of the `Authorization` value, compared case-insensitively.
const BEARER_PREFIX: &str = "bearer ";

/// Payload signed into every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username at the time of issue.
    pub username: String,
    /// User id.
    pub id: UserId,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
}

impl Claims {
    /// Claims for `user`, issued now.
    #[must_use]
    pub fn for_user(user: &User) -> Self {
        Self {
            username: user.username.as_str().to_owned(),
            id: user.id,
            iat: Utc::now().timestamp(),
        }
    }
}

/// Issues and verifies identity tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Create a token service from the signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let key = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
        }
    }

    /// Sign `claims` into a token.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the claims cannot be encoded.
    pub fn issue(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(TokenError::Signing)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if the signature or encoding is invalid.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

/// Extract the token from an `Authorization` value of the form `Bearer <token>`.
///
/// # Errors
///
/// Returns `TokenError::NotBearer` if the value uses another scheme.
pub fn bearer_token(authorization: &str) -> Result<&str, TokenError> {
    if !uses_bearer_scheme(authorization.as_bytes()) {
        return Err(TokenError::NotBearer);
    }

    authorization
        .get(BEARER_PREFIX.len()..)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(TokenError::NotBearer)
}

/// Whether an `Authorization` value uses the bearer scheme, whatever follows it.
#[must_use]
pub fn uses_bearer_scheme(authorization: &[u8]) -> bool {
    authorization
        .get(..BEARER_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(BEARER_PREFIX.as_bytes()))
}

/// Check a login attempt against the shared credential.
#[must_use]
pub fn password_matches(expected: &SecretString, supplied: &str) -> bool {
    expected.expose_secret() == supplied
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from("k9$Lm2!vQx7@Rt4#Wz8^Yb1&Nc5*Pd3e"))
    }

    fn claims() -> Claims {
        Claims {
            username: "alice".to_string(),
            id: UserId::new(3),
            iat: 1_700_000_000,
        }
    }

    #[test]
    fn test_issue_then_verify_returns_same_claims() {
        let service = service();
        let token = service.issue(&claims()).unwrap();
        assert_eq!(service.verify(&token).unwrap(), claims());
    }

    #[test]
    fn test_issue_is_deterministic_for_same_claims() {
        let service = service();
        assert_eq!(
            service.issue(&claims()).unwrap(),
            service.issue(&claims()).unwrap()
        );
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let token = service().issue(&claims()).unwrap();
        let other = TokenService::new(&SecretString::from("Zq8!mN3@pL6#xR1$wT9^vB4&cH7*jK2s"));
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(matches!(
            service().verify("not-a-token"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_verify_rejects_tampered_payload() {
        let service = service();
        let token = service.issue(&claims()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = service
            .issue(&Claims {
                id: UserId::new(4),
                ..claims()
            })
            .unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap();
        parts[1] = forged_payload;
        assert!(service.verify(&parts.join(".")).is_err());
    }

    #[test]
    fn test_bearer_token_case_insensitive() {
        assert_eq!(bearer_token("Bearer abc.def").unwrap(), "abc.def");
        assert_eq!(bearer_token("bearer abc.def").unwrap(), "abc.def");
        assert_eq!(bearer_token("BEARER abc.def").unwrap(), "abc.def");
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert!(matches!(
            bearer_token("Basic dXNlcjpwYXNz"),
            Err(TokenError::NotBearer)
        ));
        assert!(matches!(bearer_token("Bearer "), Err(TokenError::NotBearer)));
        assert!(matches!(bearer_token(""), Err(TokenError::NotBearer)));
    }

    #[test]
    fn test_uses_bearer_scheme() {
        assert!(uses_bearer_scheme(b"Bearer abc.def"));
        assert!(uses_bearer_scheme(b"bearer "));
        assert!(!uses_bearer_scheme(b"Basic dXNlcjpwYXNz"));
        assert!(!uses_bearer_scheme(b"Bearer"));
        assert!(!uses_bearer_scheme(b""));
    }

    #[test]
    fn test_password_matches() {
        let expected = SecretString::from("secret");
        assert!(password_matches(&expected, "secret"));
        assert!(!password_matches(&expected, "Secret"));
        assert!(!password_matches(&expected, ""));
    }
}
