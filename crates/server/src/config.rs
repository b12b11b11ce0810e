//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PHONEBOOK_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//! - `PHONEBOOK_DATABASE_URL` - `PostgreSQL` connection string (only for the
//!   `postgres` store; falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `PHONEBOOK_STORE` - `postgres` (default) or `memory`
//! - `PHONEBOOK_HOST` - Bind address (default: 127.0.0.1)
//! - `PHONEBOOK_PORT` - Listen port (default: 4000)
//! - `PHONEBOOK_REST_BASE_URL` - Base URL of the external persons service
//!   (default: `http://localhost:3001`)
//! - `PHONEBOOK_LOGIN_PASSWORD` - Shared login credential (default: `secret`)
//! - `PHONEBOOK_EVENT_CAPACITY` - Subscription channel capacity (default: 256)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_SIGNING_SECRET_CHARS: usize = 32;
const MIN_SIGNING_SECRET_ENTROPY: f64 = 3.3;
const DEFAULT_LOGIN_PASSWORD: &str = "secret";

/// Fragments that mark a signing secret as copied from docs or a template.
const TEMPLATE_FRAGMENTS: &[&str] = &[
    "changeme",
    "change-me",
    "placeholder",
    "example",
    "your-",
    "jwt-secret",
    "secret-key",
    "password",
    "xxxx",
    "1234567",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Which persistence backend the server runs against.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// `PostgreSQL` via sqlx.
    Postgres {
        /// Connection URL (contains password)
        database_url: SecretString,
    },
    /// Process-local store; data is lost on restart.
    Memory,
}

/// Phonebook server configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ServerConfig {
    /// Persistence backend
    pub store: StoreConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Token signing secret
    pub jwt_secret: SecretString,
    /// Shared credential accepted by the `login` mutation
    pub login_password: SecretString,
    /// Base URL of the external REST persons service
    pub rest_base_url: Url,
    /// Capacity of the `personAdded` broadcast channel
    pub event_capacity: usize,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("store", &self.store)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("login_password", &"[REDACTED]")
            .field("rest_base_url", &self.rest_base_url.as_str())
            .field("event_capacity", &self.event_capacity)
            .field("sentry", &self.sentry)
            .finish()
    }
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    /// Sentry DSN; tracking is disabled when unset
    pub dsn: Option<String>,
    /// Environment tag (e.g. `production`)
    pub environment: Option<String>,
    /// Error event sample rate
    pub sample_rate: f32,
    /// Performance trace sample rate
    pub traces_sample_rate: f32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing secret fails validation (length, placeholder detection,
    /// entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let store = StoreConfig::from_env()?;
        let host = parse_env("PHONEBOOK_HOST", "127.0.0.1")?;
        let port = parse_env("PHONEBOOK_PORT", "4000")?;
        let jwt_secret = signing_secret("PHONEBOOK_JWT_SECRET")?;
        let login_password = SecretString::from(get_env_or_default(
            "PHONEBOOK_LOGIN_PASSWORD",
            DEFAULT_LOGIN_PASSWORD,
        ));
        let rest_base_url = parse_env("PHONEBOOK_REST_BASE_URL", "http://localhost:3001")?;
        let event_capacity = parse_env("PHONEBOOK_EVENT_CAPACITY", "256")?;
        if event_capacity == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "PHONEBOOK_EVENT_CAPACITY".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let sentry = SentryConfig::from_env()?;

        Ok(Self {
            store,
            host,
            port,
            jwt_secret,
            login_password,
            rest_base_url,
            event_capacity,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        match get_env_or_default("PHONEBOOK_STORE", "postgres").as_str() {
            "postgres" => Ok(Self::Postgres {
                database_url: get_database_url("PHONEBOOK_DATABASE_URL")?,
            }),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::InvalidEnvVar(
                "PHONEBOOK_STORE".to_string(),
                format!("expected `postgres` or `memory`, got `{other}`"),
            )),
        }
    }
}

impl SentryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Read the token signing secret and reject values that are short, copied
/// from a template, or built from too few distinct characters.
fn signing_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    check_signing_secret(&value)
        .map_err(|reason| ConfigError::InsecureSecret(key.to_string(), reason))?;
    Ok(SecretString::from(value))
}

fn check_signing_secret(value: &str) -> Result<(), String> {
    let chars = value.chars().count();
    if chars < MIN_SIGNING_SECRET_CHARS {
        return Err(format!(
            "must be at least {MIN_SIGNING_SECRET_CHARS} characters (got {chars})"
        ));
    }

    let lower = value.to_lowercase();
    if let Some(fragment) = TEMPLATE_FRAGMENTS.iter().find(|f| lower.contains(*f)) {
        return Err(format!("looks like a template value (contains '{fragment}')"));
    }

    let entropy = entropy_per_char(value);
    if entropy < MIN_SIGNING_SECRET_ENTROPY {
        return Err(format!(
            "entropy too low ({entropy:.2} bits/char, need {MIN_SIGNING_SECRET_ENTROPY:.1}); generate it with `openssl rand -base64 48`"
        ));
    }

    Ok(())
}

/// Shannon entropy of `value` in bits per character.
#[allow(clippy::cast_precision_loss)]
fn entropy_per_char(value: &str) -> f64 {
    let mut chars: Vec<char> = value.chars().collect();
    if chars.is_empty() {
        return 0.0;
    }
    chars.sort_unstable();

    let total = chars.len() as f64;
    chars
        .chunk_by(|a, b| a == b)
        .map(|run| {
            let p = run.len() as f64 / total;
            -p * p.log2()
        })
        .sum()
}
