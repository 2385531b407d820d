//! Common test utilities for integration tests
//!
//! Builds the full router over a fresh in-memory store with cheap hashing
//! parameters, and drives it through `tower::ServiceExt::oneshot`.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use todolist_api::app::{build_router, AppState};
use todolist_api::config::Config;
use todolist_shared::models::{Role, UserProfile};
use todolist_shared::services::Registration;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Response status and raw body
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("body is not JSON ({}): {}", e, self.text()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

/// Test context containing the router and its state
pub struct TestContext {
    pub app: axum::Router,
    pub state: AppState,
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some(JWT_SECRET.to_string()),
        "PASSWORD_MEMORY_KIB" => Some("8".to_string()),
        "PASSWORD_ITERATIONS" => Some("1".to_string()),
        "PASSWORD_LANES" => Some("1".to_string()),
        _ => None,
    })
    .expect("test configuration")
}

impl TestContext {
    pub fn new() -> Self {
        let state = AppState::in_memory(test_config());
        let app = build_router(state.clone());
        TestContext { app, state }
    }

    /// Sends a request; `body` is sent as JSON when present
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send_request(builder.body(body).unwrap()).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> TestResponse {
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });
        self.send(Method::POST, "/auth/register", None, Some(body)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        let body = serde_json::json!({ "email": email, "password": password });
        self.send(Method::POST, "/auth/login", None, Some(body)).await
    }

    /// Registers a user and returns their profile and a fresh token
    pub async fn user(&self, username: &str, email: &str) -> (UserProfile, String) {
        let registered = self.register(username, email, "pw123").await;
        assert_eq!(registered.status, StatusCode::OK, "{}", registered.text());
        let profile: UserProfile = serde_json::from_slice(&registered.body).unwrap();

        let login = self.login(email, "pw123").await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.text());

        (profile, login.text())
    }

    /// Creates an administrator directly through the service and logs in
    pub async fn admin(&self) -> (UserProfile, String) {
        let profile = self
            .state
            .users
            .bootstrap_admin(Registration {
                username: "root".to_string(),
                email: "root@x.com".to_string(),
                password: "rootpw".to_string(),
            })
            .await
            .unwrap()
            .expect("admin created");
        assert_eq!(profile.role, Role::Admin);

        let login = self.login("root@x.com", "rootpw").await;
        assert_eq!(login.status, StatusCode::OK);

        (profile, login.text())
    }

    /// Creates a task for the token's owner and returns its JSON
    pub async fn create_task(&self, token: &str, title: &str, status: &str) -> Value {
        let body = serde_json::json!({
            "title": title,
            "description": "details",
            "status": status,
        });
        let response = self
            .send(Method::POST, "/user/tasks/create", Some(token), Some(body))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());
        response.json()
    }
}
