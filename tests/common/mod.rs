//! Shared test utilities for integration tests.
//!
//! This module provides a `TestClient` that drives the full router against a
//! private in-memory database. Methods are intentionally broad to support
//! various test scenarios across different test files.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use finanzas::config::{Config, Environment, RateLimit};
use finanzas::db::{create_in_memory_pool, migrations};
use finanzas::server;
use finanzas::state::AppState;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "secreto123";

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        database_path: PathBuf::from(":memory:"),
        migrations_path: PathBuf::from("migrations"),
        static_path: None,
        jwt_secret: "test-secret".into(),
        token_ttl_days: 7,
        cors_origins: vec!["http://localhost:3000".into()],
        rate_limit: RateLimit {
            max_requests: 10_000,
            window: Duration::from_secs(60),
        },
        environment: Environment::Production,
    }
}

/// A test client holding the application state, allowing sequential requests
/// against the same database.
pub struct TestClient {
    state: AppState,
}

impl TestClient {
    /// Create a new test client with a fresh in-memory database.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let pool = create_in_memory_pool().expect("Failed to create in-memory pool");
        {
            let mut conn = pool.get().expect("Failed to get connection");
            migrations::run_migrations(&mut conn, Path::new("migrations"))
                .expect("Failed to run migrations");
        }

        Self {
            state: AppState::new(pool, config),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        server::router(self.state.clone())
    }

    /// Send a prebuilt request and return the raw response.
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router().oneshot(request).await.unwrap()
    }

    /// Send a request and return the status and the parsed JSON body
    /// (`Value::Null` when the body is not JSON).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn get_anonymous(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn post_anonymous(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, None, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    // =========================================================================
    // Helper methods for creating entities through the API
    // =========================================================================

    pub async fn register(&self, nombre: &str, email: &str) -> (StatusCode, Value) {
        self.post_anonymous(
            "/api/auth/register",
            json!({ "nombre": nombre, "email": email, "password": TEST_PASSWORD }),
        )
        .await
    }

    /// Register a user and log in, returning the bearer token.
    pub async fn signup(&self, email: &str) -> String {
        let (status, _) = self.register("Usuario de prueba", email).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .post_anonymous(
                "/api/auth/login",
                json!({ "email": email, "password": TEST_PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    /// Create an expense in category 1 paid with method 1 and return its id.
    pub async fn create_expense(&self, token: &str, monto: f64, fecha: &str) -> i64 {
        self.create_expense_in(token, 1, monto, fecha).await
    }

    pub async fn create_expense_in(
        &self,
        token: &str,
        categoria_id: i64,
        monto: f64,
        fecha: &str,
    ) -> i64 {
        let (status, body) = self
            .post(
                "/api/gastos",
                token,
                json!({
                    "categoriaId": categoria_id,
                    "metodoPagoId": 1,
                    "monto": monto,
                    "descripcion": "Gasto de prueba",
                    "fecha": fecha,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create expense failed: {body}");
        body["id"].as_i64().unwrap()
    }

    pub async fn create_income(&self, token: &str, monto: f64, fecha: &str) -> i64 {
        let (status, body) = self
            .post(
                "/api/ingresos",
                token,
                json!({ "monto": monto, "descripcion": "Ingreso de prueba", "fecha": fecha }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create income failed: {body}");
        body["id"].as_i64().unwrap()
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
