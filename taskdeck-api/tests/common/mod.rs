//! Common test utilities for integration tests
//!
//! Each `TestContext` owns a fresh in-memory store wired into the real
//! router, so tests drive the full HTTP stack without a database.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use taskdeck_api::app::{build_router, AppState};
use taskdeck_api::config::Config;
use taskdeck_shared::repository::memory::MemoryStore;
use tower::ServiceExt;
use uuid::Uuid;

/// A decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: MemoryStore,
    pub app: axum::Router,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config::from_lookup(|key| match key {
            "DB_USER" | "DB_PASSWORD" | "DB_NAME" => Some("taskdeck".to_string()),
            "DB_HOST" => Some("localhost".to_string()),
            _ => None,
        })
        .expect("test config should load");

        let store = MemoryStore::new();
        let state = AppState::new(Arc::new(store.clone()), config);

        TestContext {
            store,
            app: build_router(state),
        }
    }

    /// Sends a request with an optional JSON body
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes))
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    /// Registers a user with a unique name and returns its ID
    pub async fn create_user(&self) -> i64 {
        let tag = Uuid::new_v4().simple().to_string();
        let response = self
            .post(
                "/api/users",
                json!({
                    "username": format!("user-{}", tag),
                    "email": format!("{}@example.com", tag),
                    "password": "correct horse",
                    "full_name": "Test User",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["user"]["user_id"].as_i64().unwrap()
    }

    /// Creates a task owned by `user_id` and returns its ID
    pub async fn create_task(&self, user_id: i64, status: &str) -> i64 {
        let response = self
            .post(
                "/api/tasks",
                json!({
                    "title": "Write report",
                    "description": "Quarterly numbers",
                    "priority": "High",
                    "status": status,
                    "user_id": user_id,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["task_id"].as_i64().unwrap()
    }
}
