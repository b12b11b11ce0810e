//! Queries and mutations over HTTP against an in-process server.

#![allow(clippy::unwrap_used)]

use phonebook_integration_tests::{
    TestContext, assert_no_errors, error_code, unreachable_rest_url,
};
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn context() -> TestContext {
    TestContext::new(unreachable_rest_url()).await
}

// ============================================================================
// Health & Playground
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = context().await;

    let resp = ctx.client.get(ctx.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = ctx.client.get(ctx.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_graphiql_is_served() {
    let ctx = context().await;
    let resp = ctx.client.get(ctx.url("/graphiql")).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("/graphql"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let ctx = context().await;
    let resp = ctx
        .client
        .get(ctx.url("/health"))
        .header("x-request-id", "test-request-42")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.headers()["x-request-id"], "test-request-42");
}

#[tokio::test]
async fn test_cors_preflight_is_allowed() {
    let ctx = context().await;
    let resp = ctx
        .client
        .request(reqwest::Method::OPTIONS, ctx.url("/graphql"))
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key("access-control-allow-origin"));
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_anonymous_queries_are_allowed() {
    let ctx = context().await;
    let (status, body) = ctx
        .graphql("{ personCount me { username } }", json!({}), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_no_errors(&body);
    assert_eq!(body["data"], json!({ "personCount": 0, "me": null }));
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let ctx = context().await;
    let (status, body) = ctx
        .graphql("{ personCount }", json!({}), Some("not.a.token"))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), Some("UNAUTHENTICATED"));
}

#[tokio::test]
async fn test_other_authorization_scheme_is_anonymous() {
    let ctx = context().await;
    let resp = ctx
        .client
        .post(ctx.url("/graphql"))
        .basic_auth("proxy", Some("pass"))
        .json(&json!({ "query": "{ personCount me { username } }" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_no_errors(&body);
    assert_eq!(body["data"], json!({ "personCount": 0, "me": null }));
}

#[tokio::test]
async fn test_me_returns_signed_in_user() {
    let ctx = context().await;
    let token = ctx.sign_up("mluukkai").await;

    let (_, body) = ctx
        .graphql("{ me { username friends { name } } }", json!({}), Some(&token))
        .await;

    assert_no_errors(&body);
    assert_eq!(
        body["data"]["me"],
        json!({ "username": "mluukkai", "friends": [] })
    );
}

#[tokio::test]
async fn test_add_person_requires_token() {
    let ctx = context().await;
    let (status, body) = ctx
        .graphql(
            r#"mutation { addPerson(name: "Arto Hellas", street: "Tapiolankatu 5 A", city: "Espoo") { id } }"#,
            json!({}),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(error_code(&body), Some("UNAUTHENTICATED"));
    assert_eq!(body["data"]["addPerson"], Value::Null);

    let (_, body) = ctx.graphql("{ personCount }", json!({}), None).await;
    assert_eq!(body["data"]["personCount"], 0);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let ctx = context().await;
    ctx.sign_up("mluukkai").await;

    let (_, body) = ctx
        .graphql(
            r#"mutation { login(username: "mluukkai", password: "wrong") { value } }"#,
            json!({}),
            None,
        )
        .await;

    assert_eq!(error_code(&body), Some("BAD_USER_INPUT"));
}

// ============================================================================
// Contacts
// ============================================================================

#[tokio::test]
async fn test_alice_adds_bob() {
    let ctx = context().await;
    let token = ctx.sign_up("alice").await;

    let (_, body) = ctx
        .graphql(
            r#"mutation { addPerson(name: "Bob Smith", street: "Main St", city: "Springfield") { id name phone address { street city } } }"#,
            json!({}),
            Some(&token),
        )
        .await;
    assert_no_errors(&body);
    let bob = body["data"]["addPerson"].clone();
    assert_eq!(bob["phone"], Value::Null);

    let (_, body) = ctx
        .graphql(
            r#"{ findPerson(name: "Bob Smith") { id name phone address { street city } } }"#,
            json!({}),
            None,
        )
        .await;
    assert_eq!(body["data"]["findPerson"], bob);

    let (_, body) = ctx
        .graphql("{ me { friends { name } } }", json!({}), Some(&token))
        .await;
    assert_eq!(
        body["data"]["me"]["friends"],
        json!([{ "name": "Bob Smith" }])
    );
}

#[tokio::test]
async fn test_duplicate_name_is_bad_user_input() {
    let ctx = context().await;
    let token = ctx.sign_up("mluukkai").await;
    ctx.add_person(&token, "Arto Hellas", None).await;

    let (_, body) = ctx
        .graphql(
            r#"mutation { addPerson(name: "Arto Hellas", street: "Tapiolankatu 5 A", city: "Espoo") { id } }"#,
            json!({}),
            Some(&token),
        )
        .await;

    assert_eq!(error_code(&body), Some("BAD_USER_INPUT"));
}

#[tokio::test]
async fn test_phone_filter_partitions_contacts() {
    let ctx = context().await;
    let token = ctx.sign_up("mluukkai").await;
    ctx.add_person(&token, "Arto Hellas", Some("040-123543")).await;
    ctx.add_person(&token, "Venla Ruuska", None).await;
    ctx.add_person(&token, "Matti Luukkainen", Some("040-432342")).await;

    let (_, body) = ctx
        .graphql(
            "{ all: allPersons { name } yes: allPersons(phone: YES) { name } no: allPersons(phone: NO) { name } }",
            json!({}),
            None,
        )
        .await;

    assert_no_errors(&body);
    assert_eq!(
        body["data"]["yes"],
        json!([{ "name": "Arto Hellas" }, { "name": "Matti Luukkainen" }])
    );
    assert_eq!(body["data"]["no"], json!([{ "name": "Venla Ruuska" }]));
    assert_eq!(body["data"]["all"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_edit_number() {
    let ctx = context().await;
    let token = ctx.sign_up("mluukkai").await;
    let before = ctx.add_person(&token, "Arto Hellas", None).await;

    let query = "mutation($name: String!, $phone: String!) {
        editNumber(name: $name, phone: $phone) { id name phone address { street city } }
    }";

    let (_, body) = ctx
        .graphql(query, json!({ "name": "Nobody Here", "phone": "040-123543" }), None)
        .await;
    assert_no_errors(&body);
    assert_eq!(body["data"]["editNumber"], Value::Null);

    let (_, body) = ctx
        .graphql(query, json!({ "name": "Arto Hellas", "phone": "040-123543" }), None)
        .await;
    assert_no_errors(&body);
    let mut expected = before;
    expected["phone"] = json!("040-123543");
    assert_eq!(body["data"]["editNumber"], expected);
}

#[tokio::test]
async fn test_add_as_friend_twice_keeps_one_entry() {
    let ctx = context().await;
    let owner = ctx.sign_up("mluukkai").await;
    ctx.add_person(&owner, "Arto Hellas", None).await;
    let token = ctx.sign_up("hellas").await;

    let query = r#"mutation { addAsFriend(name: "Arto Hellas") { username friends { name } } }"#;
    ctx.graphql(query, json!({}), Some(&token)).await;
    let (_, body) = ctx.graphql(query, json!({}), Some(&token)).await;

    assert_no_errors(&body);
    assert_eq!(
        body["data"]["addAsFriend"]["friends"],
        json!([{ "name": "Arto Hellas" }])
    );

    let (_, body) = ctx
        .graphql(
            r#"mutation { addAsFriend(name: "Nobody Here") { username } }"#,
            json!({}),
            Some(&token),
        )
        .await;
    assert_eq!(error_code(&body), Some("NOT_FOUND"));
}
