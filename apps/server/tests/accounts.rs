use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use roster_server::{api::app_router, build_state, config::Config};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

async fn build_test_router() -> (Router, TempDir) {
    let tmp = tempdir().unwrap();
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: tmp.path().join("test.db").to_string_lossy().to_string(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(30),
    };
    let state = build_state(&config).await.unwrap();
    (app_router(state, &config), tmp)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn new_account(username: &str, email: &str, name: Option<&str>) -> Value {
    json!({
        "username": username,
        "email": email,
        "secret": "s3cret",
        "name": name,
    })
}

fn usernames(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["username"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn account_lifecycle() {
    let (app, _tmp) = build_test_router().await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/accounts",
        Some(new_account("alice", "alice@example.com", Some("Alice"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["username"], "alice");
    assert_eq!(created["name"], "Alice");
    assert!(created.get("secret").is_none());
    let id = created["id"].as_i64().unwrap();
    assert!(id > 0);

    let (status, fetched) = send(&app, Method::GET, &format!("/api/v1/accounts/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/accounts/{}", id),
        Some(json!({ "email": "alice@work.example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["email"], "alice@work.example.com");
    assert_eq!(updated["username"], "alice");
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_ne!(updated["updatedAt"], created["updatedAt"]);

    let (status, by_username) =
        send(&app, Method::GET, "/api/v1/accounts/by-username/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_username, updated);

    let (status, listed) = send(&app, Method::GET, "/api/v1/accounts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(usernames(&listed), vec!["alice"]);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/accounts/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/api/v1/accounts/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/v1/accounts/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn duplicate_username_or_email_is_conflict() {
    let (app, _tmp) = build_test_router().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/accounts",
        Some(new_account("alice", "alice@example.com", None)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/accounts",
        Some(new_account("alice", "other@example.com", None)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);
    assert!(body["message"].as_str().unwrap().contains("alice"));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/accounts",
        Some(new_account("bob", "alice@example.com", None)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("alice@example.com"));

    let (status, bob) = send(
        &app,
        Method::POST,
        "/api/v1/accounts",
        Some(new_account("bob", "bob@example.com", None)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/accounts/{}", bob["id"]),
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_input_is_rejected() {
    let (app, _tmp) = build_test_router().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/accounts",
        Some(new_account("alice", "not-an-email", None)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/accounts",
        Some(new_account("admin", "admin@example.com", None)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/accounts",
        Some(new_account("   ", "blank@example.com", None)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Missing required field never reaches the service.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/accounts",
        Some(json!({ "username": "carol", "email": "carol@example.com" })),
    )
    .await;
    assert!(status.is_client_error());

    let (_, listed) = send(&app, Method::GET, "/api/v1/accounts", None).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_accounts_are_not_found() {
    let (app, _tmp) = build_test_router().await;

    for uri in [
        "/api/v1/accounts/0",
        "/api/v1/accounts/-3",
        "/api/v1/accounts/42",
        "/api/v1/accounts/by-username/ghost",
    ] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["code"], 404);
    }

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/accounts/42",
        Some(json!({ "name": "Nobody" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicates_and_search_by_name() {
    let (app, _tmp) = build_test_router().await;
    for (username, name) in [
        ("ann1", Some("Ann")),
        ("bob", Some("Bob")),
        ("ann2", Some("Ann")),
        ("anon1", None),
        ("anon2", None),
    ] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/accounts",
            Some(new_account(username, &format!("{}@example.com", username), name)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, duplicates) = send(&app, Method::GET, "/api/v1/accounts/duplicates", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(usernames(&duplicates), vec!["ann1", "ann2"]);

    let (status, found) = send(&app, Method::GET, "/api/v1/accounts/search?name=Ann", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(usernames(&found), vec!["ann1", "ann2"]);

    let (status, found) = send(&app, Method::GET, "/api/v1/accounts/search?name=Zed", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(found.as_array().unwrap().is_empty());

    let (status, _) = send(&app, Method::GET, "/api/v1/accounts/search", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
