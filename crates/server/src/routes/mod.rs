//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! POST /graphql        - Queries and mutations
//! GET  /graphql        - WebSocket upgrade for subscriptions
//!                        (graphql-transport-ws and graphql-ws)
//! GET  /graphiql       - Interactive playground
//! GET  /health         - Liveness check
//! GET  /health/ready   - Readiness check (store reachable)
//! ```

pub mod graphql;
pub mod health;

use std::time::Duration;

use axum::{
    Router,
    http::{Request, Response},
    middleware,
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/graphql",
            get(graphql::subscription).post(graphql::execute),
        )
        .route("/graphiql", get(graphql::graphiql))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// The full application: routes, middleware and state.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
