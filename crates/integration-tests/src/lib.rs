//! Integration tests for Phonebook.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (memory store, stub REST service)
//! cargo test -p phonebook-integration-tests
//!
//! # Include the PostgreSQL store tests
//! PHONEBOOK_TEST_DATABASE_URL=postgres://localhost/phonebook_test \
//!     cargo test -p phonebook-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `graphql_http` - Queries and mutations over HTTP
//! - `subscriptions` - `personAdded` over a GraphQL WebSocket
//! - `rest_bridge` - `allPersonsREST` against a stub REST service
//! - `postgres_store` - `PostgreSQL` store behaviour (ignored by default)

use std::net::SocketAddr;

use axum::{Json, Router, http::StatusCode, routing::get};
use phonebook_server::db::Stores;
use phonebook_server::routes;
use phonebook_server::services::AddressBook;
use phonebook_server::services::auth::TokenService;
use phonebook_server::services::events::EventBus;
use phonebook_server::services::rest::RestClient;
use phonebook_server::state::AppState;
use reqwest::Client;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

/// Signing secret used by every test server.
pub const TEST_JWT_SECRET: &str = "k9$Lm2!vQx7@Rt4#Wz8^Yb1&Nc5*Pd3e";

/// The shared login credential of every test server.
pub const TEST_PASSWORD: &str = "secret";

/// A running in-process server and a client pointed at it.
pub struct TestContext {
    pub client: Client,
    pub addr: SocketAddr,
}

impl TestContext {
    /// Start a server on a random port with an in-memory store.
    ///
    /// `rest_base_url` is where `allPersonsREST` fetches from; pass
    /// [`unreachable_rest_url`] when the test doesn't use it.
    pub async fn new(rest_base_url: Url) -> Self {
        let book = AddressBook::new(
            Stores::memory(),
            TokenService::new(&SecretString::from(TEST_JWT_SECRET)),
            EventBus::new(64),
            RestClient::new(rest_base_url).expect("Failed to create REST client"),
            SecretString::from(TEST_PASSWORD),
        );
        let app = routes::app(AppState::from_book(book));
        let addr = serve(app).await;

        Self {
            client: Client::new(),
            addr,
        }
    }

    /// Base URL of the server, e.g. `http://127.0.0.1:43121`.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// WebSocket URL of the GraphQL endpoint.
    pub fn ws_url(&self) -> String {
        format!("ws://{}/graphql", self.addr)
    }

    /// POST a GraphQL document and return status and JSON body.
    pub async fn graphql(&self, query: &str, variables: Value, token: Option<&str>) -> (StatusCode, Value) {
        let mut request = self
            .client
            .post(self.url("/graphql"))
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.expect("Failed to send GraphQL request");
        let status = response.status();
        let body = response.json().await.expect("Response was not JSON");
        (status, body)
    }

    /// Create a user and log in as them, returning the token.
    pub async fn sign_up(&self, username: &str) -> String {
        let (_, body) = self
            .graphql(
                "mutation($u: String!) { createUser(username: $u) { id } }",
                json!({ "u": username }),
                None,
            )
            .await;
        assert_no_errors(&body);

        let (_, body) = self
            .graphql(
                "mutation($u: String!, $p: String!) { login(username: $u, password: $p) { value } }",
                json!({ "u": username, "p": TEST_PASSWORD }),
                None,
            )
            .await;
        assert_no_errors(&body);
        body["data"]["login"]["value"]
            .as_str()
            .expect("login returned no token")
            .to_owned()
    }

    /// Add a contact as the owner of `token`.
    pub async fn add_person(&self, token: &str, name: &str, phone: Option<&str>) -> Value {
        let (_, body) = self
            .graphql(
                "mutation($name: String!, $phone: String) {
                    addPerson(name: $name, phone: $phone, street: \"Tapiolankatu 5 A\", city: \"Espoo\") {
                        id name phone address { street city }
                    }
                }",
                json!({ "name": name, "phone": phone }),
                Some(token),
            )
            .await;
        assert_no_errors(&body);
        body["data"]["addPerson"].clone()
    }
}

/// Bind `app` on a random local port and serve it in the background.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server error");
    });

    addr
}

/// Start a stub of the external REST service answering `GET /users`.
pub async fn stub_rest_service(status: StatusCode, users: Value) -> Url {
    let app = Router::new().route(
        "/users",
        get(move || {
            let users = users.clone();
            async move { (status, Json(users)) }
        }),
    );
    let addr = serve(app).await;
    Url::parse(&format!("http://{addr}")).expect("Invalid stub URL")
}

/// A base URL nothing listens on.
pub fn unreachable_rest_url() -> Url {
    Url::parse("http://127.0.0.1:9").expect("Invalid URL")
}

/// Panic with the GraphQL errors if the body has any.
pub fn assert_no_errors(body: &Value) {
    assert!(body.get("errors").is_none(), "unexpected errors: {body}");
}

/// The `extensions.code` of the first GraphQL error.
pub fn error_code(body: &Value) -> Option<&str> {
    body.get("errors")?
        .get(0)?
        .get("extensions")?
        .get("code")?
        .as_str()
}
