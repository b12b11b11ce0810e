//! Caller identification for both transports.
//!
//! HTTP requests may be anonymous: a missing `Authorization` header, or one
//! using a scheme other than bearer, yields no user. A bearer token that does
//! not verify is rejected with 401.
//! WebSocket connections must present a valid token in
//! `connectionParams.Authorization` or the connection is refused.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::AddressBook;
use crate::services::auth::{self, TokenError};
use crate::state::AppState;

/// The signed-in user, stored in GraphQL request or connection data.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Extractor that optionally resolves the caller from the bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
///     match user {
///         Some(CurrentUser(u)) => format!("Hello, {}!", u.username),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(value) = parts
            .headers
            .get(AUTHORIZATION)
            .filter(|value| auth::uses_bearer_scheme(value.as_bytes()))
        else {
            return Ok(Self(None));
        };

        let value = value
            .to_str()
            .map_err(|_| AppError::InvalidToken(TokenError::NotBearer))?;
        let user = identify(state.book(), value).await?;
        Ok(Self(Some(user)))
    }
}

/// Resolve the user for a WebSocket connection from its `connection_init`
/// payload.
///
/// # Errors
///
/// Returns `AppError::Unauthenticated` if no token was sent and
/// `AppError::InvalidToken` if it does not verify.
pub async fn connection_user(
    book: &AddressBook,
    params: &serde_json::Value,
) -> Result<CurrentUser, AppError> {
    let value = ["Authorization", "authorization"]
        .iter()
        .find_map(|key| params.get(*key))
        .and_then(serde_json::Value::as_str)
        .ok_or(AppError::Unauthenticated)?;

    identify(book, value).await
}

async fn identify(book: &AddressBook, authorization: &str) -> Result<CurrentUser, AppError> {
    let user = book.authenticate(authorization).await?;
    set_sentry_user(&user.id, user.username.as_str());
    tracing::debug!(user = %user.id, "Authenticated caller");
    Ok(CurrentUser(user))
}
