//! Shared helpers for integration tests
//!
//! - A test router wired the way a service would wire svckit
//! - Request/response helpers
//! - A log capture writer for asserting on emitted events

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use svckit_app::default_router;
use svckit_common::{Code, Error, Result, ValidatedJson, Validator};

#[derive(Debug, Deserialize, Validate)]
pub struct Signup {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(range(min = 13))]
    pub age: u32,
}

async fn create_signup(ValidatedJson(signup): ValidatedJson<Signup>) -> Json<Value> {
    Json(json!({ "email": signup.email }))
}

async fn create_signup_manual(
    axum::extract::State(validator): axum::extract::State<Validator>,
    Json(signup): Json<Signup>,
) -> Result<Json<Value>> {
    validator.validate(&signup)?;
    Ok(Json(json!({ "email": signup.email })))
}

async fn slow_lookup() -> Result<Json<Value>> {
    tokio::time::timeout(Duration::from_millis(5), std::future::pending::<()>()).await?;
    Ok(Json(json!({})))
}

async fn leaky_failure() -> Result<Json<Value>> {
    Err(Error::wrap(std::io::Error::other(
        "connection to db failed: password=hunter2",
    )))
}

async fn taken_slug() -> Result<Json<Value>> {
    Err(Error::new("team slug already taken").with_code(Code::Conflict))
}

fn fetch_row() -> std::result::Result<i64, sqlx::Error> {
    Err(sqlx::Error::RowNotFound)
}

async fn missing_row() -> Result<Json<Value>> {
    let id = fetch_row()?;
    Ok(Json(json!({ "id": id })))
}

async fn unimplemented_feature() -> Result<Json<Value>> {
    Err(Error::not_implemented())
}

/// Router mirroring how a service composes svckit pieces
pub fn test_router() -> Router {
    let validator = Validator::new().with_field_name("email", "emailAddress");

    default_router()
        .route("/v1/signups", post(create_signup))
        .route("/v1/signups/manual", post(create_signup_manual))
        .route("/v1/slow", get(slow_lookup))
        .route("/v1/leaky", get(leaky_failure))
        .route("/v1/teams/taken", get(taken_slug))
        .route("/v1/rows/missing", get(missing_row))
        .route("/v1/feature", get(unimplemented_feature))
        .with_state(validator)
}

pub fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);

    match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&b).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Parse response body as JSON Value
pub async fn parse_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// In-memory sink for formatted log lines
#[derive(Debug, Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Install a JSON subscriber writing into this capture for the current thread
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
