//! Common test utilities for the HTTP tests.
//!
//! This module provides:
//! - A router wired to a registry on a manual clock
//! - Configurations for offline and mocked upstreams
//! - Request builders and response readers

use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use bf_core::state::{ManualClock, WorkflowRegistry};
use bf_protocol::config_models::AppConfig;
use bf_server::{create_router, AppState};
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    #[allow(dead_code)]
    pub registry: Arc<WorkflowRegistry>,
    #[allow(dead_code)]
    pub clock: Arc<ManualClock>,
}

/// Build the router for `config` with time under test control.
pub fn test_app(config: &AppConfig) -> TestApp {
    let clock = Arc::new(ManualClock::starting_now());
    let registry = Arc::new(WorkflowRegistry::with_clock(clock.clone()));
    let state = AppState::from_config(config, registry.clone()).expect("valid test config");

    TestApp {
        router: create_router(state),
        registry,
        clock,
    }
}

/// Configuration pointing at `base_url`, with fast streams.
pub fn config_for(base_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.upstream.base_url = base_url.to_string();
    config.upstream.request_timeout_secs = 2;
    config.streams.snapshot_interval_ms = 10;
    config.streams.fallback_interval_ms = 1;
    config
}

/// Configuration with the synthetic fallback forced.
#[allow(dead_code)]
pub fn offline_config() -> AppConfig {
    let mut config = config_for("http://127.0.0.1:9");
    config.upstream.force_fallback = true;
    config
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

#[allow(dead_code)]
pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

#[allow(dead_code)]
pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

/// Send a request and read the whole body.
pub async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, String, Bytes) {
    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");

    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");

    (status, content_type, bytes)
}

#[allow(dead_code)]
pub async fn send_json(app: &TestApp, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let (status, _, bytes) = send(app, request).await;
    let value = serde_json::from_slice(&bytes).expect("JSON body");
    (status, value)
}
