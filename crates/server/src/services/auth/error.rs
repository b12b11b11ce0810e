//! Token error types.

use thiserror::Error;

/// Errors that can occur while issuing or verifying identity tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature, encoding or claims are invalid.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    /// The token could not be signed.
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// The `Authorization` value does not use the bearer scheme.
    #[error("authorization must use the bearer scheme")]
    NotBearer,

    /// The token is valid but its user no longer exists.
    #[error("token subject not found")]
    UnknownSubject,
}
