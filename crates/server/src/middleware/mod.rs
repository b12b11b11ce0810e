//! HTTP middleware and extractors.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (permissive, browser clients on other origins)
//!
//! Authentication is not a layer: the GraphQL handlers resolve the caller with
//! the [`OptionalAuth`] extractor, and WebSocket connections at
//! `connection_init` via [`auth::connection_user`].

pub mod auth;
pub mod request_id;

pub use auth::{CurrentUser, OptionalAuth};
pub use request_id::request_id_middleware;
