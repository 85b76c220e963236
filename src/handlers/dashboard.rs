use axum::{extract::State, routing::get, Json, Router};

use crate::{
    errors::{ErrorResponse, ServiceError},
    services::analytics::DashboardStats,
    AppState,
};

/// Request counts by status and total pending order value
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 500, description = "Totals out of range", body = ErrorResponse),
    ),
    tag = "Dashboard"
)]
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, ServiceError> {
    Ok(Json(state.services.analytics.dashboard_stats().await?))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard/stats", get(get_dashboard_stats))
}
