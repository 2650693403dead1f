//! Shared helpers for the in-process daemon scenarios.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use samsa_daemon::{routes, state::AppState};
use samsa_notify::Notifier;
use samsa_orders::OrderLog;
use tower::ServiceExt; // oneshot

/// Notifier stub with a fixed outcome that records every text it was given.
pub struct RecordingNotifier {
    outcome: bool,
    sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new(outcome: bool) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn channel(&self) -> &'static str {
        "recording"
    }

    async fn notify(&self, text: &str) -> bool {
        self.sent.lock().unwrap().push(text.to_string());
        self.outcome
    }
}

/// State writing orders to `dir/orders.json` and serving `dir/dist`.
pub fn make_state(notifier: Arc<dyn Notifier>, dir: &Path) -> Arc<AppState> {
    Arc::new(AppState::new(
        notifier,
        OrderLog::new(dir.join("orders.json")),
        dir.join("dist"),
    ))
}

/// Drive the router with a single request and return (status, body_bytes).
pub async fn call(router: axum::Router, req: Request<axum::body::Body>) -> (StatusCode, bytes::Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

pub async fn post_order(state: &Arc<AppState>, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/order")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = call(routes::build_router(Arc::clone(state)), req).await;
    (status, parse_json(bytes))
}

pub async fn get(state: &Arc<AppState>, uri: &str) -> (StatusCode, bytes::Bytes) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    call(routes::build_router(Arc::clone(state)), req).await
}

/// Parse body bytes as a `serde_json::Value`.
pub fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}
