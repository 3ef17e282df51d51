//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - Test configuration with a fixed passphrase
//! - A user store seeded with a regular user and an admin
//! - Request and response helpers driving the router in-process

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::Duration;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokengate_api::app::{build_router, AppState};
use tokengate_api::config::Config;
use tokengate_api::middleware::translator::AUDIT_TARGET;
use tokengate_shared::auth::jwt::{Claims, SigningKey, TokenCodec};
use tokengate_shared::auth::password::{Argon2Hashing, PasswordHashing};
use tokengate_shared::auth::principal::Principal;
use tokengate_shared::models::user::{
    InMemoryUserStore, NewUser, Role, UserRecord, UserStore, UserStoreError,
};
use async_trait::async_trait;
use tower::ServiceExt;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

pub const SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const LOGIN_PATH: &str = "/api/login";

pub const ALICE: &str = "alice";
pub const ALICE_PASSWORD: &str = "correct-horse";
pub const ADMIN: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// Default configuration with the test passphrase
pub fn test_config() -> Config {
    Config::defaults()
        .unwrap()
        .set_override("jwt.passphrase", SECRET)
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap()
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: Router,
    pub config: Config,
    pub users: Arc<dyn UserStore>,
}

/// User store whose backend is always down
pub struct UnavailableStore;

#[async_trait]
impl UserStore for UnavailableStore {
    async fn get_user(&self, _username: &str) -> Result<Option<UserRecord>, UserStoreError> {
        Err(UserStoreError::Unavailable("connection refused".to_string()))
    }

    async fn create_user(&self, _user: NewUser) -> Result<UserRecord, UserStoreError> {
        Err(UserStoreError::Unavailable("connection refused".to_string()))
    }
}

/// Cheap parameters; verification reads them from the stored hash.
fn hashing() -> Arc<Argon2Hashing> {
    Arc::new(Argon2Hashing::with_cost(1024, 1, 1).unwrap())
}

impl TestContext {
    /// Creates a context with default configuration
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Creates a context with custom configuration
    pub async fn with_config(config: Config) -> Self {
        let hashing = hashing();

        let users = Arc::new(InMemoryUserStore::with_users([
            UserRecord {
                username: ALICE.to_string(),
                password_hash: hashing.hash(ALICE_PASSWORD).unwrap(),
                role: Role::User,
            },
            UserRecord {
                username: ADMIN.to_string(),
                password_hash: hashing.hash(ADMIN_PASSWORD).unwrap(),
                role: Role::Admin,
            },
        ]));

        Self::with_store(config, users)
    }

    /// Creates a context over an arbitrary user store
    pub fn with_store(config: Config, users: Arc<dyn UserStore>) -> Self {
        let state = AppState::new(config.clone(), Arc::clone(&users), hashing()).unwrap();

        TestContext {
            app: build_router(state),
            config,
            users,
        }
    }

    /// Sends one request through the full middleware stack
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Posts a JSON body
    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Attempts a login
    pub async fn login(&self, username: &str, password: &str) -> Response<Body> {
        self.post_json(
            LOGIN_PATH,
            serde_json::json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Logs in and returns the full token header value
    pub async fn token_header(&self, username: &str, password: &str) -> String {
        let response = self.login(username, password).await;
        assert_eq!(response.status(), 200, "login as {} failed", username);

        response
            .headers()
            .get(self.config.jwt.authorization_header_name.as_str())
            .expect("token header")
            .to_str()
            .unwrap()
            .to_string()
    }

    /// Sends a GET with an optional token header value
    pub async fn get(&self, uri: &str, token_header: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(value) = token_header {
            builder = builder.header(self.config.jwt.authorization_header_name.as_str(), value);
        }

        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Signs arbitrary claims with the configured key
    pub fn sign(&self, claims: &Claims) -> String {
        codec(&self.config.jwt.passphrase).encode(claims).unwrap()
    }

    /// Claims for alice with the given lifetime
    pub fn alice_claims(&self, lifetime: Duration) -> Claims {
        Claims::with_expiration(&Principal::new(ALICE, Role::User.granted_authorities()), lifetime)
    }
}

/// Codec for a passphrase, with a one-hour lifetime
pub fn codec(passphrase: &str) -> TokenCodec {
    TokenCodec::new(SigningKey::from_passphrase(passphrase).unwrap(), Duration::hours(1))
}

/// Reads a response body as raw bytes
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// One audit event seen by [`AuditCapture`]
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub level: Level,
    pub fields: HashMap<String, String>,
}

impl AuditEvent {
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_default()
    }
}

/// Subscriber layer collecting audit records
#[derive(Debug, Clone, Default)]
pub struct AuditCapture(Arc<Mutex<Vec<AuditEvent>>>);

impl AuditCapture {
    pub fn events(&self) -> Vec<AuditEvent> {
        self.0.lock().unwrap().clone()
    }
}

struct FieldVisitor<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

impl<S: Subscriber> Layer<S> for AuditCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target() != AUDIT_TARGET {
            return;
        }

        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));

        self.0.lock().unwrap().push(AuditEvent {
            level: *event.metadata().level(),
            fields,
        });
    }
}
