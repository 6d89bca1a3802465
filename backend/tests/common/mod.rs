//! Common test utilities for integration tests
//!
//! Each `TestApp` owns a private in-memory SQLite database.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use microblog_backend::{config::AppConfig, db, routes, state::AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application with a fresh database
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application with a custom configuration
    pub async fn with_config(config: AppConfig) -> Self {
        let pool = db::create_memory_pool()
            .await
            .expect("Failed to create test database pool");
        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(pool.clone(), config.clone()).expect("Invalid test config");
        let app = routes::create_router(state);

        Self { app, pool, config }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Make an authenticated GET request
    pub async fn get_auth(&self, path: &str, token: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Make an authenticated POST request with JSON body
    pub async fn post_auth(&self, path: &str, body: &str, token: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Make an authenticated DELETE request
    pub async fn delete_auth(&self, path: &str, token: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("DELETE")
            .uri(path)
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Register a user and log in, returning the access token
    pub async fn create_test_user(&self, username: &str) -> String {
        let body = json!({ "username": username, "password": "SecurePassword123!" });

        let (status, _) = self.post("/api/v1/auth/register", &body.to_string()).await;
        assert_eq!(status, StatusCode::CREATED, "registration failed");

        let (status, response) = self.post("/api/v1/auth/login", &body.to_string()).await;
        assert_eq!(status, StatusCode::OK, "login failed");

        let response: Value = serde_json::from_str(&response).unwrap();
        response["access_token"].as_str().unwrap().to_string()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.port = 0;
    config.jwt.secret = "test-secret-key-for-testing-only-32chars".to_string();
    config
}
