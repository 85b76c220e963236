#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use discount_desk_api::{
    build_router,
    config::AppConfig,
    logging,
    repositories::{InMemoryStorage, Storage},
    AppState,
};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SEED: u64 = 42;

/// Helper harness driving the full router against a freshly seeded store.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with the demo fixtures loaded.
    pub fn new() -> Self {
        Self::with_storage(Arc::new(InMemoryStorage::seeded(TEST_SEED)))
    }

    pub fn empty() -> Self {
        Self::with_storage(Arc::new(InMemoryStorage::new()))
    }

    fn with_storage(storage: Arc<dyn Storage>) -> Self {
        let cfg = AppConfig::new("127.0.0.1".to_string(), 18_080, "test".to_string());
        let state = AppState::new(cfg, storage, logging::discard_logger());
        let router = build_router(state.clone());
        Self { router, state }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends raw bytes as a JSON body, for malformed-payload tests.
    pub async fn request_raw(&self, method: Method, uri: &str, raw: &'static str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(raw))
            .expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response body as json")
}

pub async fn response_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    String::from_utf8(bytes.to_vec()).expect("response body is utf-8")
}
