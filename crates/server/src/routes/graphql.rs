//! GraphQL transport adapters.
//!
//! Both adapters attach the caller as a [`CurrentUser`] to the data the
//! schema sees; resolvers decide whether a user is required.

use async_graphql::http::{ALL_WEBSOCKET_PROTOCOLS, GraphiQLSource};
use async_graphql::{Data, ErrorExtensions};
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::{
    extract::{State, WebSocketUpgrade},
    response::{Html, IntoResponse, Response},
};

use crate::middleware::auth::{OptionalAuth, connection_user};
use crate::state::AppState;

/// Path the schema is served on, for both HTTP and WebSocket.
pub const GRAPHQL_PATH: &str = "/graphql";

/// Execute a query or mutation sent over HTTP.
pub async fn execute(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = request.into_inner();
    if let Some(user) = user {
        request = request.data(user);
    }
    state.schema().execute(request).await.into()
}

/// Upgrade to a GraphQL WebSocket. The connection is refused at
/// `connection_init` unless it carries a valid token.
pub async fn subscription(
    State(state): State<AppState>,
    protocol: GraphQLProtocol,
    upgrade: WebSocketUpgrade,
) -> Response {
    let schema = state.schema().clone();
    let book = state.book().clone();

    upgrade
        .protocols(ALL_WEBSOCKET_PROTOCOLS)
        .on_upgrade(move |stream| {
            GraphQLWebSocket::new(stream, schema, protocol)
                .on_connection_init(move |params| async move {
                    let user = connection_user(&book, &params).await.map_err(|e| {
                        tracing::debug!(error = %e, "WebSocket connection refused");
                        e.extend()
                    })?;
                    let mut data = Data::default();
                    data.insert(user);
                    Ok(data)
                })
                .serve()
        })
}

/// Interactive playground.
pub async fn graphiql() -> impl IntoResponse {
    Html(
        GraphiQLSource::build()
            .endpoint(GRAPHQL_PATH)
            .subscription_endpoint(GRAPHQL_PATH)
            .finish(),
    )
}
