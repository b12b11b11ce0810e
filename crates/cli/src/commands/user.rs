//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! pb-cli user create -u mluukkai
//! ```

use phonebook_core::Username;

use super::{CliError, stores};

/// Create a new user with an empty friends list.
///
/// # Errors
///
/// Returns error if the username is too short or already taken.
pub async fn create(username: &str) -> Result<(), CliError> {
    let username = Username::parse(username)?;
    let (_, stores) = stores().await?;

    let user = stores.users.create(&username).await?;
    tracing::info!("Created user {} with id {}", user.username, user.id);
    Ok(())
}
