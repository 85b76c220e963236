use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, patch},
    Json, Router,
};
use tracing::info;
use validator::Validate;

use super::common::{json_rejection, query_rejection, INVALID_REQUEST_DATA};
use crate::{
    errors::{ErrorResponse, ServiceError},
    models::{DiscountRequest, DiscountRequestPatch, RequestWithCustomer},
    services::{
        filter::FilterCriteria,
        review::{BulkStatusUpdate, BulkUpdateResponse},
    },
    AppState,
};

fn criteria_from(
    query: Result<Query<FilterCriteria>, QueryRejection>,
) -> Result<FilterCriteria, ServiceError> {
    let Query(criteria) = query.map_err(query_rejection)?;
    criteria.validate_bounds()?;
    Ok(criteria)
}

/// List every discount request
#[utoipa::path(
    get,
    path = "/api/discount-requests",
    responses(
        (status = 200, description = "All discount requests in insertion order", body = [DiscountRequest]),
    ),
    tag = "Discount Requests"
)]
pub async fn list_discount_requests(
    State(state): State<AppState>,
) -> Result<Json<Vec<DiscountRequest>>, ServiceError> {
    Ok(Json(state.storage.list_discount_requests().await?))
}

/// List discount requests matching the filter criteria
#[utoipa::path(
    get,
    path = "/api/discount-requests/filtered",
    params(FilterCriteria),
    responses(
        (status = 200, description = "Matching discount requests", body = [DiscountRequest]),
        (status = 400, description = "Unparseable or non-finite bounds", body = ErrorResponse),
    ),
    tag = "Discount Requests"
)]
pub async fn list_filtered_discount_requests(
    State(state): State<AppState>,
    query: Result<Query<FilterCriteria>, QueryRejection>,
) -> Result<Json<Vec<DiscountRequest>>, ServiceError> {
    let criteria = criteria_from(query)?;
    Ok(Json(
        state
            .storage
            .list_discount_requests_filtered(&criteria)
            .await?,
    ))
}

/// Filtered requests joined with customer name and tier
#[utoipa::path(
    get,
    path = "/api/discount-requests/with-customers",
    params(FilterCriteria),
    responses(
        (status = 200, description = "Requests with customer details", body = [RequestWithCustomer]),
        (status = 400, description = "Unparseable or non-finite bounds", body = ErrorResponse),
    ),
    tag = "Discount Requests"
)]
pub async fn list_discount_requests_with_customers(
    State(state): State<AppState>,
    query: Result<Query<FilterCriteria>, QueryRejection>,
) -> Result<Json<Vec<RequestWithCustomer>>, ServiceError> {
    let criteria = criteria_from(query)?;
    Ok(Json(
        state
            .services
            .analytics
            .requests_with_customers(&criteria)
            .await?,
    ))
}

/// Partially update a discount request
///
/// Decided requests (approved or rejected) cannot move to another status.
#[utoipa::path(
    patch,
    path = "/api/discount-requests/{id}",
    params(("id" = String, Path, description = "Discount request id")),
    request_body = DiscountRequestPatch,
    responses(
        (status = 200, description = "Updated discount request", body = DiscountRequest),
        (status = 400, description = "Invalid body or refused status change", body = ErrorResponse),
        (status = 404, description = "Discount request not found", body = ErrorResponse),
    ),
    tag = "Discount Requests"
)]
pub async fn update_discount_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<DiscountRequestPatch>, JsonRejection>,
) -> Result<Json<DiscountRequest>, ServiceError> {
    let Json(changes) = body.map_err(json_rejection)?;
    changes.validate()?;
    let updated = state.services.review.update_request(&id, changes).await?;
    info!(request_id = %updated.id, status = %updated.status, "discount request updated");
    Ok(Json(updated))
}

/// Set one status on many discount requests
#[utoipa::path(
    patch,
    path = "/api/discount-requests/bulk",
    request_body = BulkStatusUpdate,
    responses(
        (status = 200, description = "Requests updated; unknown ids are skipped", body = BulkUpdateResponse),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
    ),
    tag = "Discount Requests"
)]
pub async fn bulk_update_discount_requests(
    State(state): State<AppState>,
    body: Result<Json<BulkStatusUpdate>, JsonRejection>,
) -> Result<Json<BulkUpdateResponse>, ServiceError> {
    let Json(update) =
        body.map_err(|_| ServiceError::BadRequest(INVALID_REQUEST_DATA.to_string()))?;
    let response = state
        .services
        .review
        .bulk_update_status(&update.ids, update.status)
        .await?;
    info!(message = %response.message, "bulk status update");
    Ok(Json(response))
}

pub fn discount_request_routes() -> Router<AppState> {
    Router::new()
        .route("/discount-requests", get(list_discount_requests))
        .route(
            "/discount-requests/filtered",
            get(list_filtered_discount_requests),
        )
        .route(
            "/discount-requests/with-customers",
            get(list_discount_requests_with_customers),
        )
        .route(
            "/discount-requests/bulk",
            patch(bulk_update_discount_requests),
        )
        .route("/discount-requests/:id", patch(update_discount_request))
}
