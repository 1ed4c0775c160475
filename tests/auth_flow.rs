//! End-to-end flow through the assembled router:
//! register → login → protected requests → refresh → uploads.
//!
//! Stores are real SQLite files in a temp directory.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use lyked_backend::{
    auth::{JwtHandler, UserStore},
    build_router,
    uploads::UploadStore,
    AppState,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret";

struct TestServer {
    app: Router,
    _dir: TempDir,
}

impl TestServer {
    fn start() -> Self {
        let dir = TempDir::new().unwrap();
        let user_store = Arc::new(UserStore::new(dir.path().join("auth.db")).unwrap());
        let upload_store = Arc::new(UploadStore::new(dir.path().join("uploads.db")).unwrap());
        let jwt_handler = Arc::new(JwtHandler::new(SECRET.to_string()));

        Self {
            app: build_router(AppState::new(user_store, upload_store, jwt_handler)),
            _dir: dir,
        }
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register_and_login(&self, username: &str, email: &str, password: &str) -> String {
        let (status, _) = self
            .call(
                "POST",
                "/users/register",
                None,
                Some(json!({ "username": username, "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .call(
                "POST",
                "/users/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_alice_scenario() {
    let server = TestServer::start();

    let (status, body) = server
        .call(
            "POST",
            "/users/register",
            None,
            Some(json!({ "username": "alice", "email": "a@x.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["user"]["id"].is_string());
    assert!(!body.to_string().contains("secret123"));

    let (status, body) = server
        .call(
            "POST",
            "/users/login",
            None,
            Some(json!({ "email": "a@x.com", "username": "alice", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Invalid email/username or password" }));

    let (status, body) = server.call("GET", "/upload/all", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Authorization header missing" }));
}

#[tokio::test]
async fn test_token_grants_identity() {
    let server = TestServer::start();
    let token = server.register_and_login("alice", "a@x.com", "secret123").await;

    let (status, body) = server.call("GET", "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "a@x.com");

    let (status, body) = server.call("POST", "/users/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");
}

#[tokio::test]
async fn test_fresh_token_refresh_refused() {
    let server = TestServer::start();
    let token = server.register_and_login("alice", "a@x.com", "secret123").await;

    let (status, body) = server
        .call("POST", "/users/refresh-token", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Token not eligible for refresh yet" }));
}

#[tokio::test]
async fn test_tampered_token_rejected() {
    let server = TestServer::start();
    let token = server.register_and_login("alice", "a@x.com", "secret123").await;

    // Flip the first character of the signature segment
    let sig_start = token.rfind('.').unwrap() + 1;
    let first = &token[sig_start..sig_start + 1];
    let replacement = if first == "A" { "B" } else { "A" };
    let tampered = format!(
        "{}{}{}",
        &token[..sig_start],
        replacement,
        &token[sig_start + 1..]
    );

    let (status, body) = server.call("GET", "/users/me", Some(&tampered), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Invalid or expired token" }));
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let server = TestServer::start();
    server.register_and_login("alice", "a@x.com", "secret123").await;

    let (status, _) = server
        .call(
            "POST",
            "/users/register",
            None,
            Some(json!({ "username": "alice2", "email": "a@x.com", "password": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Original password still works
    let (status, body) = server
        .call(
            "POST",
            "/users/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
}

#[tokio::test]
async fn test_uploads_are_private_per_user() {
    let server = TestServer::start();
    let alice = server.register_and_login("alice", "a@x.com", "secret123").await;
    let bob = server.register_and_login("bob", "b@x.com", "hunter22").await;

    let (status, body) = server
        .call(
            "POST",
            "/upload/upload",
            Some(&alice),
            Some(json!({
                "title": "first",
                "video_link": "https://video.example/1",
                "folders": ["favs"],
                "tags": ["live"]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let upload_id = body["upload_id"].as_str().unwrap().to_string();

    let (_, body) = server.call("GET", "/upload/all", Some(&bob), None).await;
    assert_eq!(body["uploads"], json!([]));

    let (status, _) = server
        .call(
            "DELETE",
            &format!("/upload/delete?id={}", upload_id),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = server.call("GET", "/upload/all", Some(&alice), None).await;
    assert_eq!(body["uploads"].as_array().unwrap().len(), 1);
    assert_eq!(body["uploads"][0]["title"], "first");
    assert_eq!(body["uploads"][0]["folders"], json!(["favs"]));

    let (status, _) = server
        .call(
            "DELETE",
            &format!("/upload/delete?id={}", upload_id),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = server.call("GET", "/upload/all", Some(&alice), None).await;
    assert_eq!(body["uploads"], json!([]));
}
