/*!
 * # Health Check Module
 *
 * - Basic health check (`/health`) - up/down status and version
 * - Readiness check (`/health/ready`) - confirms the store answers reads
 * - Version info (`/health/version`) - build metadata from `build.rs`
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use crate::AppState;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Record counts reported by readiness and `/status`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreCounts {
    pub customers: usize,
    pub discount_requests: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Readiness {
    pub status: HealthStatus,
    pub ready: bool,
    pub store: Option<StoreCounts>,
    pub timestamp: DateTime<Utc>,
}

pub async fn store_counts(state: &AppState) -> Result<StoreCounts, crate::errors::ServiceError> {
    Ok(StoreCounts {
        customers: state.storage.list_customers().await?.len(),
        discount_requests: state.storage.list_discount_requests().await?.len(),
    })
}

/// Returns build and version information
pub async fn version_info() -> impl IntoResponse {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "commit": option_env!("GIT_HASH").unwrap_or("unknown"),
        "built": option_env!("BUILD_TIME").unwrap_or("unknown"),
    }))
}

/// Health check response that doesn't require state
pub async fn simple_health_check() -> impl IntoResponse {
    debug!("Health check endpoint called");

    (
        StatusCode::OK,
        Json(json!({
            "status": HealthStatus::Up,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let readiness = match store_counts(&state).await {
        Ok(counts) => Readiness {
            status: HealthStatus::Up,
            ready: true,
            store: Some(counts),
            timestamp: Utc::now(),
        },
        Err(e) => {
            error!("Store readiness check failed: {}", e);
            Readiness {
                status: HealthStatus::Down,
                ready: false,
                store: None,
                timestamp: Utc::now(),
            }
        }
    };

    let status_code = match readiness.status {
        HealthStatus::Up => StatusCode::OK,
        HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(readiness))
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(simple_health_check))
        .route("/ready", get(readiness_check))
        .route("/version", get(version_info))
}
