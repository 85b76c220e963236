use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common::json_rejection;
use crate::{
    errors::{ErrorResponse, ServiceError},
    services::analytics::MarginImpactReport,
    AppState,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct MarginImpactRequest {
    /// Selected request ids; unknown ids are ignored
    #[serde(default)]
    pub ids: Vec<String>,
}

/// Margin, risk and twelve-month trend for a selection of requests
#[utoipa::path(
    post,
    path = "/api/analytics/margin-impact",
    request_body = MarginImpactRequest,
    responses(
        (status = 200, description = "Margin impact report", body = MarginImpactReport),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 500, description = "Totals out of range", body = ErrorResponse),
    ),
    tag = "Analytics"
)]
pub async fn margin_impact(
    State(state): State<AppState>,
    body: Result<Json<MarginImpactRequest>, JsonRejection>,
) -> Result<Json<MarginImpactReport>, ServiceError> {
    let Json(selection) = body.map_err(json_rejection)?;
    Ok(Json(
        state.services.analytics.margin_impact(&selection.ids).await?,
    ))
}

pub fn analytics_routes() -> Router<AppState> {
    Router::new().route("/analytics/margin-impact", post(margin_impact))
}
