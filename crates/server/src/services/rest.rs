//! Client for the external REST persons service.
//!
//! Fetches `GET <base>/users` and keeps only the fields the schema exposes as
//! `PersonREST`. No retry and no circuit breaking; every failure is reported
//! as a [`RestError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

/// Errors that can occur when calling the REST persons service.
#[derive(Debug, Error)]
pub enum RestError {
    /// HTTP request failed or the body could not be decoded.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The configured base URL cannot be joined with the endpoint path.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// A person as returned by the REST service, reshaped to `{name, id, email}`.
///
/// Extra fields in the upstream payload are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestPerson {
    pub name: String,
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub email: String,
}

/// Accept both numeric and string ids from upstream.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// REST persons client.
#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    /// Create a client for the service rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: Url) -> Result<Self, RestError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, base_url })
    }

    /// URL of the users listing.
    fn users_url(&self) -> Result<Url, RestError> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base.join("users")?)
    }

    /// Fetch every person from the service.
    ///
    /// # Errors
    ///
    /// Returns error if the service is unreachable, answers with a non-success
    /// status, or returns a body that is not a list of persons.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn list_persons(&self) -> Result<Vec<RestPerson>, RestError> {
        let response = self.client.get(self.users_url()?).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RestError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
