//! Token commands.
//!
//! # Usage
//!
//! ```bash
//! # Print a token, ready for `Authorization: Bearer <token>`
//! pb-cli token issue -u mluukkai
//! ```

use phonebook_server::services::auth::{Claims, TokenService};

use super::{CliError, stores};

/// Print a signed token for an existing user.
///
/// # Errors
///
/// Returns error if the user doesn't exist or signing fails.
pub async fn issue(username: &str) -> Result<(), CliError> {
    let (config, stores) = stores().await?;

    let user = stores
        .users
        .get_by_username(username)
        .await?
        .ok_or_else(|| CliError::UserNotFound(username.to_owned()))?;

    let token = TokenService::new(&config.jwt_secret)
        .issue(&Claims::for_user(&user))?;

    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }
    Ok(())
}
