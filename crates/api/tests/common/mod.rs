#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use dx_db::models::threshold::Threshold;
use dx_events::{NotifyError, ThresholdNotifier};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use dx_api::config::ServerConfig;
use dx_api::router::build_app_router;
use dx_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".parse().unwrap()],
        request_timeout_secs: 30,
        db_max_connections: 5,
    }
}

/// Notifier that records the ids of every changed-set it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    pub calls: Mutex<Vec<Vec<i64>>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<Vec<i64>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ThresholdNotifier for RecordingNotifier {
    async fn notify(&self, changed: &[Threshold]) -> Result<(), NotifyError> {
        self.calls
            .lock()
            .unwrap()
            .push(changed.iter().map(|t| t.id).collect());
        if self.fail {
            return Err(dx_events::EmailError::Build("relay unavailable".into()).into());
        }
        Ok(())
    }
}

/// Build the full application router with a fresh recording notifier.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, Arc::new(RecordingNotifier::default()))
}

/// Build the full application router around the given notifier.
///
/// Uses the same router constructor as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_test_app_with(pool: PgPool, notifier: Arc<dyn ThresholdNotifier>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        notifier,
    };
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    put_raw(app, uri, body.to_string()).await
}

pub async fn put_raw(app: Router, uri: &str, body: String) -> Response<Body> {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and return the parsed JSON body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
