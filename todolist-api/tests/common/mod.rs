//! Common test utilities for integration tests
//!
//! Builds the real router over an in-memory store with three accounts:
//! two non-staff users (`alice`, `bob`) and one staff user (`admin`), each
//! with a ready access token.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use todolist_api::app::{build_router, AppState};
use todolist_api::config::Config;
use todolist_shared::auth::jwt::{create_token, Claims, TokenType};
use todolist_shared::auth::password::hash_password;
use todolist_shared::models::user::{CreateUser, User};
use todolist_shared::store::{memory::MemoryStore, EntityStore};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Password of the account created by [`TestContext::with_login_user`]
pub const LOGIN_PASSWORD: &str = "Corr3ct!horse";

/// An account and its bearer token
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn username(&self) -> &str {
        &self.user.username
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: Router,
    pub alice: TestUser,
    pub bob: TestUser,
    pub staff: TestUser,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some(JWT_SECRET.to_string()),
            _ => None,
        })?;

        let store = Arc::new(MemoryStore::new());
        let alice = create_user(&store, "alice", false, "unused-hash").await?;
        let bob = create_user(&store, "bob", false, "unused-hash").await?;
        let staff = create_user(&store, "admin", true, "unused-hash").await?;

        let app = build_router(AppState::new(store.clone(), config));

        Ok(Self {
            store,
            app,
            alice,
            bob,
            staff,
        })
    }

    /// Adds an account whose password is [`LOGIN_PASSWORD`]
    pub async fn with_login_user(&self, username: &str) -> anyhow::Result<TestUser> {
        let hash = hash_password(LOGIN_PASSWORD)?;
        create_user(&self.store, username, false, &hash).await
    }

    /// Sends a request and returns the status and JSON body
    ///
    /// An empty body comes back as `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let body = body.map(|body| body.to_string());
        self.send_raw(method, uri, token, body.as_deref()).await
    }

    /// Like [`TestContext::send`] with a verbatim JSON body
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.app.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok((status, json))
    }

    pub async fn get(&self, uri: &str, user: &TestUser) -> anyhow::Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, Some(&user.token), None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        user: &TestUser,
        body: Value,
    ) -> anyhow::Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, Some(&user.token), Some(body)).await
    }

    pub async fn patch(
        &self,
        uri: &str,
        user: &TestUser,
        body: Value,
    ) -> anyhow::Result<(StatusCode, Value)> {
        self.send(Method::PATCH, uri, Some(&user.token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: &TestUser) -> anyhow::Result<(StatusCode, Value)> {
        self.send(Method::DELETE, uri, Some(&user.token), None).await
    }

    /// Creates a category and a priority through the API; returns their IDs
    pub async fn catalog(&self, user: &TestUser) -> anyhow::Result<(i64, i64)> {
        let (status, category) = self
            .post("/v1/categories", user, serde_json::json!({ "name": "Work" }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "category create failed: {}", category);

        let (status, priority) = self
            .post("/v1/priorities", user, serde_json::json!({ "name": "High" }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "priority create failed: {}", priority);

        Ok((id_of(&category)?, id_of(&priority)?))
    }

    /// Creates a task through the API; returns its ID
    pub async fn task(&self, user: &TestUser, title: &str) -> anyhow::Result<i64> {
        let (category, priority) = self.catalog(user).await?;
        let (status, task) = self
            .post(
                "/v1/tasks",
                user,
                serde_json::json!({ "title": title, "category": category, "priority": priority }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "task create failed: {}", task);

        id_of(&task)
    }
}

async fn create_user(
    store: &MemoryStore,
    username: &str,
    is_staff: bool,
    password_hash: &str,
) -> anyhow::Result<TestUser> {
    let user = store
        .users()
        .create(CreateUser {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_staff,
        })
        .await?;

    let claims = Claims::new(user.id, &user.username, TokenType::Access);
    let token = create_token(&claims, JWT_SECRET)?;

    Ok(TestUser { user, token })
}

/// Reads the `id` field of a JSON row
pub fn id_of(row: &Value) -> anyhow::Result<i64> {
    row["id"]
        .as_i64()
        .ok_or_else(|| anyhow::anyhow!("row has no id: {}", row))
}

/// IDs of a JSON array of rows
pub fn ids(rows: &Value) -> Vec<i64> {
    rows.as_array()
        .map(|rows| rows.iter().filter_map(|row| row["id"].as_i64()).collect())
        .unwrap_or_default()
}
