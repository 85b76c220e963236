use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use slog::Logger;
use tracing::{debug, instrument, warn};
use utoipa::ToSchema;

use crate::{
    errors::ServiceError,
    metrics,
    models::{DiscountRequest, DiscountRequestPatch, PatchedRequest, RequestStatus},
    repositories::Storage,
};

/// Body of `PATCH /api/discount-requests/bulk`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatusUpdate {
    pub ids: Vec<String>,
    pub status: RequestStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateResponse {
    #[schema(example = "Updated 2 out of 3 requests")]
    pub message: String,
    /// Only the requests that were actually updated
    pub updated: Vec<DiscountRequest>,
}

/// Applies reviewer decisions and keeps the audit trail.
#[derive(Clone)]
pub struct ReviewService {
    storage: Arc<dyn Storage>,
    audit: Logger,
}

impl ReviewService {
    pub fn new(storage: Arc<dyn Storage>, audit: Logger) -> Self {
        Self { storage, audit }
    }

    /// Applies a partial update to one request.
    #[instrument(skip(self, patch))]
    pub async fn update_request(
        &self,
        id: &str,
        patch: DiscountRequestPatch,
    ) -> Result<DiscountRequest, ServiceError> {
        let result = self.storage.update_discount_request(id, patch).await;
        match result {
            Ok(Some(patched)) => {
                self.record_decision(&patched);
                Ok(patched.request)
            }
            Ok(None) => Err(ServiceError::NotFound(format!(
                "Discount request {} not found",
                id
            ))),
            Err(err @ ServiceError::InvalidStatus(_)) => {
                metrics::record_refused_transition();
                slog::warn!(self.audit, "status change refused";
                    "request_id" => id,
                    "reason" => err.to_string());
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Sets `status` on every id concurrently.
    ///
    /// Unknown ids and refused transitions are skipped without failing the
    /// batch; only the requests actually updated are returned.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn bulk_update_status(
        &self,
        ids: &[String],
        status: RequestStatus,
    ) -> Result<BulkUpdateResponse, ServiceError> {
        let outcomes = join_all(ids.iter().map(|id| {
            let patch = DiscountRequestPatch::status(status);
            async move { (id, self.update_request(id, patch).await) }
        }))
        .await;

        let mut updated = Vec::with_capacity(outcomes.len());
        for (id, outcome) in outcomes {
            match outcome {
                Ok(request) => updated.push(request),
                Err(ServiceError::NotFound(_)) => {
                    debug!(request_id = %id, "bulk update skipped unknown id")
                }
                Err(ServiceError::InvalidStatus(reason)) => {
                    warn!(request_id = %id, %reason, "bulk update skipped decided request")
                }
                Err(err) => return Err(err),
            }
        }

        Ok(BulkUpdateResponse {
            message: format!("Updated {} out of {} requests", updated.len(), ids.len()),
            updated,
        })
    }

    fn record_decision(&self, patched: &PatchedRequest) {
        let request = &patched.request;
        metrics::record_decision(&request.status.to_string());
        slog::info!(self.audit, "discount request status applied";
            "request_id" => &request.id,
            "customer_id" => &request.customer_id,
            "from" => patched.previous_status.to_string(),
            "to" => request.status.to_string(),
            "http_request_id" => http_request_id(),
            "updated_at" => request.updated_at.to_rfc3339());
    }
}

fn http_request_id() -> String {
    crate::tracing::current_request_id()
        .map(|rid| rid.as_str().to_string())
        .unwrap_or_default()
}
