//! Correlation ids for HTTP requests.
//!
//! An `x-request-id` set by an upstream proxy is kept when it is short
//! printable ASCII; otherwise a UUID v4 is generated. The id is recorded on
//! the request span, tagged on the Sentry scope and echoed in the response.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_UPSTREAM_ID_LEN: usize = 128;

fn upstream_id(headers: &HeaderMap) -> Option<&str> {
    let id = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?;
    let usable = (1..=MAX_UPSTREAM_ID_LEN).contains(&id.len())
        && id.bytes().all(|b| b.is_ascii_graphic());
    usable.then_some(id)
}

/// Tag the request and its response with a correlation id.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let id = upstream_id(request.headers())
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);

    Span::current().record("request_id", id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &id));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
