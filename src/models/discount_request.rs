use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::customer::Customer;
use crate::errors::ServiceError;

/// Region assigned to requests created without one.
pub const DEFAULT_REGION: &str = "Oman";
/// Placeholder name used in joined views when a request's customer is missing.
pub const UNKNOWN_CUSTOMER_NAME: &str = "Unknown Customer";
/// Placeholder tier used in joined views when a request's customer is missing.
pub const UNKNOWN_CUSTOMER_TIER: &str = "N/A";
/// Largest accepted order value, OMR.
pub const MAX_ORDER_VALUE: Decimal = dec!(1000000000000000);
pub const MAX_DISCOUNT_PERCENTAGE: Decimal = Decimal::ONE_HUNDRED;

fn validate_discount_percentage(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= Decimal::ZERO && *value <= MAX_DISCOUNT_PERCENTAGE {
        Ok(())
    } else {
        let mut err = ValidationError::new("range");
        err.message = Some("Discount must be between 0 and 100".into());
        Err(err)
    }
}

fn validate_order_value(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= Decimal::ZERO && *value <= MAX_ORDER_VALUE {
        Ok(())
    } else {
        let mut err = ValidationError::new("range");
        err.message = Some("Order value must be between 0 and 10^15".into());
        Err(err)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
pub enum Product {
    #[serde(rename = "Wire Rod")]
    #[strum(serialize = "Wire Rod")]
    WireRod,
    Rebar,
    Billets,
}

impl Product {
    /// Lower-cased name as it appears in free text.
    pub fn keyword(&self) -> &'static str {
        match self {
            Product::WireRod => "wire rod",
            Product::Rebar => "rebar",
            Product::Billets => "billets",
        }
    }
}

/// Sales pipeline stage of a request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum RequestStage {
    Inquiry,
    Negotiation,
    #[serde(rename = "Final Review")]
    #[strum(serialize = "Final Review")]
    FinalReview,
    #[serde(rename = "Ready to Close")]
    #[strum(serialize = "Ready to Close")]
    ReadyToClose,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Review status. `Pending` is the only state with outgoing transitions.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    /// Re-applying the current status is always allowed.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        *self == next || !self.is_terminal()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRequest {
    #[schema(example = "request-1-arabian-wire")]
    pub id: String,
    #[schema(example = "customer-1-arabian-steel")]
    pub customer_id: String,
    pub product: Product,
    #[schema(example = "A500")]
    pub grade: String,
    /// Requested discount, percent
    #[schema(example = "12.5")]
    pub discount_percentage: Decimal,
    /// Order value in OMR
    #[schema(example = "485000")]
    pub order_value: Decimal,
    pub stage: RequestStage,
    pub priority: Priority,
    pub status: RequestStatus,
    #[schema(example = "Oman")]
    pub region: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiscountRequest {
    /// Margin given away if the request is granted: `orderValue × discount / 100`.
    pub fn margin_impact(&self) -> Result<Decimal, ServiceError> {
        self.order_value
            .checked_mul(self.discount_percentage)
            .and_then(|value| value.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(|| {
                ServiceError::InternalError(format!("margin impact of {} overflowed", self.id))
            })
    }

    /// Merges `patch` into the record and refreshes `updated_at`.
    ///
    /// A status change out of a decided state is refused before any field is
    /// touched, so a failed patch leaves the record as it was.
    pub fn apply_patch(
        &mut self,
        patch: DiscountRequestPatch,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        if let Some(next) = patch.status {
            if !self.status.can_transition_to(next) {
                return Err(ServiceError::InvalidStatus(format!(
                    "Discount request {} is already {} and cannot move to {}",
                    self.id, self.status, next
                )));
            }
            self.status = next;
        }
        if let Some(customer_id) = patch.customer_id {
            self.customer_id = customer_id;
        }
        if let Some(product) = patch.product {
            self.product = product;
        }
        if let Some(grade) = patch.grade {
            self.grade = grade;
        }
        if let Some(discount) = patch.discount_percentage {
            self.discount_percentage = discount;
        }
        if let Some(value) = patch.order_value {
            self.order_value = value;
        }
        if let Some(stage) = patch.stage {
            self.stage = stage;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(region) = patch.region {
            self.region = region;
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Insert form of [`DiscountRequest`]. New requests always start pending.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewDiscountRequest {
    #[validate(length(min = 1))]
    pub customer_id: String,
    pub product: Product,
    #[validate(length(min = 1, max = 50))]
    pub grade: String,
    #[validate(custom = "validate_discount_percentage")]
    pub discount_percentage: Decimal,
    #[validate(custom = "validate_order_value")]
    pub order_value: Decimal,
    pub stage: RequestStage,
    pub priority: Priority,
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub region: Option<String>,
}

impl NewDiscountRequest {
    pub fn into_request(self, id: String, now: DateTime<Utc>) -> DiscountRequest {
        DiscountRequest {
            id,
            customer_id: self.customer_id,
            product: self.product,
            grade: self.grade,
            discount_percentage: self.discount_percentage,
            order_value: self.order_value,
            stage: self.stage,
            priority: self.priority,
            status: RequestStatus::Pending,
            region: self.region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update accepted by `PATCH /api/discount-requests/:id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DiscountRequestPatch {
    #[validate(length(min = 1))]
    pub customer_id: Option<String>,
    pub product: Option<Product>,
    #[validate(length(min = 1, max = 50))]
    pub grade: Option<String>,
    #[validate(custom = "validate_discount_percentage")]
    pub discount_percentage: Option<Decimal>,
    #[validate(custom = "validate_order_value")]
    pub order_value: Option<Decimal>,
    pub stage: Option<RequestStage>,
    pub priority: Option<Priority>,
    pub status: Option<RequestStatus>,
    #[validate(length(min = 1, max = 100))]
    pub region: Option<String>,
}

impl DiscountRequestPatch {
    pub fn status(status: RequestStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

/// Outcome of a stored update: the record after the patch and the status it
/// had just before, read under the same lock.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchedRequest {
    pub previous_status: RequestStatus,
    pub request: DiscountRequest,
}

/// A request joined with its customer's name and tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestWithCustomer {
    #[serde(flatten)]
    pub request: DiscountRequest,
    #[schema(example = "Arabian Steel Co.")]
    pub customer_name: String,
    #[schema(example = "Premium")]
    pub customer_tier: String,
}

impl RequestWithCustomer {
    /// Orphaned requests get the "Unknown Customer" / "N/A" placeholder.
    pub fn join(request: DiscountRequest, customer: Option<&Customer>) -> Self {
        let (customer_name, customer_tier) = match customer {
            Some(customer) => (customer.name.clone(), customer.tier.to_string()),
            None => (
                UNKNOWN_CUSTOMER_NAME.to_string(),
                UNKNOWN_CUSTOMER_TIER.to_string(),
            ),
        };
        Self {
            request,
            customer_name,
            customer_tier,
        }
    }
}
