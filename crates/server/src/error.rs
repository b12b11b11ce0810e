//! Unified error handling with Sentry integration.
//!
//! Every failure a resolver or transport adapter can produce is an
//! [`AppError`]. Each variant maps to a machine-readable code that clients see
//! in `extensions.code`; server-class failures are captured to Sentry before
//! they leave the process and their detail is not exposed.

use async_graphql::ErrorExtensions;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use phonebook_core::TextError;

use crate::db::RepositoryError;
use crate::services::auth::TokenError;
use crate::services::rest::RestError;

/// Client-facing error codes.
pub mod code {
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const BAD_USER_INPUT: &str = "BAD_USER_INPUT";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const UPSTREAM_UNAVAILABLE: &str = "UPSTREAM_UNAVAILABLE";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

/// Application-level error type for the address book.
#[derive(Debug, Error)]
pub enum AppError {
    /// The operation needs a signed-in user and there is none.
    #[error("not authenticated")]
    Unauthenticated,

    /// A token was supplied but could not be verified.
    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    /// Input rejected by a validation rule.
    #[error("{message}")]
    BadUserInput {
        message: String,
        /// Name of the offending argument, when known.
        argument: Option<&'static str>,
    },

    /// Wrong username or password on login.
    #[error("wrong credentials")]
    WrongCredentials,

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The external REST service failed.
    #[error("REST service unavailable: {0}")]
    Upstream(#[from] RestError),

    /// Store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TextError> for AppError {
    fn from(err: TextError) -> Self {
        Self::BadUserInput {
            argument: Some(err.field()),
            message: err.to_string(),
        }
    }
}

impl AppError {
    /// The code reported in `extensions.code`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated | Self::InvalidToken(_) => code::UNAUTHENTICATED,
            Self::BadUserInput { .. } | Self::WrongCredentials => code::BAD_USER_INPUT,
            Self::NotFound(_) | Self::Database(RepositoryError::NotFound) => code::NOT_FOUND,
            Self::Database(err) if err.is_user_input() => code::BAD_USER_INPUT,
            Self::Upstream(_) => code::UPSTREAM_UNAVAILABLE,
            Self::Database(_) | Self::Internal(_) => code::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the failure is on our side (or upstream) rather than the caller's.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self.code(),
            code::INTERNAL_SERVER_ERROR | code::UPSTREAM_UNAVAILABLE
        )
    }

    /// Message safe to show to clients.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Upstream(_) => "External service error".to_owned(),
            Self::Internal(_) => "Internal server error".to_owned(),
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Database(RepositoryError::Validation(msg)) => format!("validation failed: {msg}"),
            Self::Database(RepositoryError::NotFound) => "not found".to_owned(),
            Self::Database(_) => "Internal server error".to_owned(),
            Self::InvalidToken(_) => "invalid token".to_owned(),
            _ => self.to_string(),
        }
    }

    /// Log and capture server-class errors.
    fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }
    }
}

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        self.report();
        async_graphql::Error::new(self.client_message()).extend_with(|_, ext| {
            ext.set("code", self.code());
            if let Self::BadUserInput {
                argument: Some(arg),
                ..
            } = self
            {
                ext.set("invalidArgs", *arg);
            }
        })
    }
}

/// Rejections raised by the transport adapters before a GraphQL operation runs.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();

        let status = match self.code() {
            code::UNAUTHENTICATED => StatusCode::UNAUTHORIZED,
            code::BAD_USER_INPUT => StatusCode::BAD_REQUEST,
            code::NOT_FOUND => StatusCode::NOT_FOUND,
            code::UPSTREAM_UNAVAILABLE => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = json!({
            "data": null,
            "errors": [{
                "message": self.client_message(),
                "extensions": { "code": self.code() },
            }],
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the current request.
pub fn set_sentry_user(user_id: &impl ToString, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: Some(username.to_owned()),
            ..Default::default()
        }));
    });
}
