use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{
    errors::ServiceError, models::RegionalData, services::analytics::RegionalContext, AppState,
};

/// Regional rows for a region (exact, case-sensitive match)
#[utoipa::path(
    get,
    path = "/api/regional-data/{region}",
    params(("region" = String, Path, description = "Region name, e.g. Oman")),
    responses((status = 200, description = "Regional rows; empty for unknown regions", body = [RegionalData])),
    tag = "Regional Data"
)]
pub async fn get_regional_data(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<Vec<RegionalData>>, ServiceError> {
    Ok(Json(state.storage.get_regional_data(&region).await?))
}

/// Supply/demand summary per product for a region
#[utoipa::path(
    get,
    path = "/api/regional-data/{region}/context",
    params(("region" = String, Path, description = "Region name, e.g. Oman")),
    responses((status = 200, description = "Regional context", body = RegionalContext)),
    tag = "Regional Data"
)]
pub async fn get_regional_context(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<RegionalContext>, ServiceError> {
    Ok(Json(
        state.services.analytics.regional_context(&region).await?,
    ))
}

pub fn regional_routes() -> Router<AppState> {
    Router::new()
        .route("/regional-data/:region", get(get_regional_data))
        .route("/regional-data/:region/context", get(get_regional_context))
}
