//! Discount Desk API Library
//!
//! Review backend for steel-product discount requests: filtering, approval,
//! margin-impact analytics and a rule-based pricing assistant over an
//! in-memory store.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware_helpers;
pub mod models;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use slog::Logger;
use std::sync::Arc;

use crate::repositories::Storage;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(config: config::AppConfig, storage: Arc<dyn Storage>, base_logger: Logger) -> Self {
        let services = handlers::AppServices::new(storage.clone(), base_logger);
        Self {
            storage,
            config,
            services,
        }
    }
}

/// Service status reported at `/status`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    pub git: String,
    pub build_time: String,
    pub environment: String,
    pub filter_value_ceiling: f64,
    pub store: health::StoreCounts,
    pub timestamp: String,
}

// Resource routes, nested under /api by build_router
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::discount_requests::discount_request_routes())
        .merge(handlers::customers::customer_routes())
        .merge(handlers::regional::regional_routes())
        .merge(handlers::dashboard::dashboard_routes())
        .merge(handlers::analytics::analytics_routes())
        .merge(handlers::assistant::assistant_routes())
}

/// Full application router: resources, status/health, metrics and docs.
///
/// CORS and compression are left to the binary so tests can drive the bare
/// router.
pub fn build_router(state: AppState) -> Router {
    metrics::init();

    Router::new()
        .route("/", get(|| async { "discount-desk-api up" }))
        .route("/status", get(api_status))
        .route("/metrics", get(metrics_endpoint))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .nest("/health", health::health_routes())
        .nest("/api", api_routes())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(tracing::configure_http_tracing())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

async fn api_status(
    State(state): State<AppState>,
) -> Result<Json<ServiceStatus>, errors::ServiceError> {
    let store = health::store_counts(&state).await?;
    Ok(Json(ServiceStatus {
        status: "ok".to_string(),
        service: "discount-desk-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        git: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
        environment: state.config.environment.clone(),
        filter_value_ceiling: state.config.filter_value_ceiling,
        store,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

async fn metrics_endpoint() -> impl IntoResponse {
    match metrics::metrics_handler().await {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            ::tracing::error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("metrics error"),
            )
        }
    }
}
