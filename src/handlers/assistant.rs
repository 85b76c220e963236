use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;
use validator::Validate;

use super::common::json_rejection;
use crate::{
    errors::{ErrorResponse, ServiceError},
    metrics,
    services::{
        assistant::{self, AssistantReply},
        filter::FilterCriteria,
    },
    AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssistantQuery {
    #[validate(length(min = 1, message = "message must not be empty"))]
    pub message: String,
    /// Request the question is about, looked up regardless of filters
    pub focused_request_id: Option<String>,
    /// Narrows the requests in view; omitted means every request
    pub filters: Option<FilterCriteria>,
}

/// Ask a pricing question about the requests in view
#[utoipa::path(
    post,
    path = "/api/assistant/query",
    request_body = AssistantQuery,
    responses(
        (status = 200, description = "Matched intent and reply text", body = AssistantReply),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Focused request not found", body = ErrorResponse),
        (status = 500, description = "Totals out of range", body = ErrorResponse),
    ),
    tag = "Assistant"
)]
pub async fn query_assistant(
    State(state): State<AppState>,
    body: Result<Json<AssistantQuery>, JsonRejection>,
) -> Result<Json<AssistantReply>, ServiceError> {
    let Json(query) = body.map_err(json_rejection)?;
    query.validate()?;

    let criteria = query.filters.unwrap_or_else(FilterCriteria::all);
    criteria.validate_bounds()?;

    let analytics = &state.services.analytics;
    let in_view = analytics.requests_with_customers(&criteria).await?;
    let focused = match query.focused_request_id.as_deref() {
        Some(id) => Some(analytics.request_with_customer(id).await?),
        None => None,
    };

    let reply = assistant::respond(&query.message, &in_view, focused.as_ref())?;
    metrics::record_assistant_query(&reply.intent.to_string());
    debug!(intent = %reply.intent, in_view = in_view.len(), "assistant query answered");
    Ok(Json(reply))
}

pub fn assistant_routes() -> Router<AppState> {
    Router::new().route("/assistant/query", post(query_assistant))
}
