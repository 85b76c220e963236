use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::errors::ServiceError;
use crate::models::DiscountRequest;

/// Wildcard accepted by the product, region and stage criteria.
pub const ALL: &str = "All";

/// Narrowing criteria for the discount request list.
///
/// Text criteria match exactly; `"All"` or an absent value matches anything.
/// Value bounds are inclusive, an absent minimum is 0 and an absent maximum is
/// unbounded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FilterCriteria {
    /// Product name, e.g. "Wire Rod", or "All"
    pub product_type: Option<String>,
    /// Region name, e.g. "Oman", or "All"
    pub region: Option<String>,
    /// Pipeline stage, e.g. "Negotiation", or "All"
    pub stage: Option<String>,
    /// Inclusive lower bound on order value
    pub min_value: Option<f64>,
    /// Inclusive upper bound on order value
    pub max_value: Option<f64>,
}

fn matches_text(criterion: Option<&str>, actual: &str) -> bool {
    match criterion {
        None => true,
        Some(ALL) => true,
        Some(wanted) => wanted == actual,
    }
}

impl FilterCriteria {
    pub fn all() -> Self {
        Self::default()
    }

    /// Rejects NaN or infinite bounds.
    pub fn validate_bounds(&self) -> Result<(), ServiceError> {
        let mut issues = Vec::new();
        if self.min_value.is_some_and(|v| !v.is_finite()) {
            issues.push("minValue: must be a finite number".to_string());
        }
        if self.max_value.is_some_and(|v| !v.is_finite()) {
            issues.push("maxValue: must be a finite number".to_string());
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::ValidationError(issues))
        }
    }

    pub fn matches(&self, request: &DiscountRequest) -> bool {
        let value = request.order_value.to_f64().unwrap_or_default();
        matches_text(self.product_type.as_deref(), &request.product.to_string())
            && matches_text(self.region.as_deref(), &request.region)
            && matches_text(self.stage.as_deref(), &request.stage.to_string())
            && value >= self.min_value.unwrap_or(0.0)
            && self.max_value.map_or(true, |max| value <= max)
    }
}

/// Keeps the requests matching `criteria`, preserving their order.
pub fn filter_requests(
    requests: impl IntoIterator<Item = DiscountRequest>,
    criteria: &FilterCriteria,
) -> Vec<DiscountRequest> {
    requests
        .into_iter()
        .filter(|request| criteria.matches(request))
        .collect()
}
