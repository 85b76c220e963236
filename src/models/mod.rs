//! Domain records for the discount review desk.
//!
//! Records serialize with camelCase field names. Monetary and percentage
//! fields are fixed-point [`rust_decimal::Decimal`] values and go over the
//! wire as strings; derived analytics in [`crate::services::analytics`] use
//! plain JSON numbers instead.

pub mod customer;
pub mod customer_sales;
pub mod discount_request;
pub mod regional_data;

pub use customer::{Customer, CustomerTier, NewCustomer};
pub use customer_sales::{CustomerSalesData, Month, NewCustomerSalesData};
pub use discount_request::{
    DiscountRequest, DiscountRequestPatch, NewDiscountRequest, PatchedRequest, Priority, Product,
    RequestStage, RequestStatus, RequestWithCustomer, DEFAULT_REGION, MAX_DISCOUNT_PERCENTAGE,
    MAX_ORDER_VALUE, UNKNOWN_CUSTOMER_NAME, UNKNOWN_CUSTOMER_TIER,
};
pub use regional_data::{Demand, InventoryStatus, NewRegionalData, RegionalData};

/// Builds the id used for generated records: `{prefix}-{uuid}`.
pub(crate) fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}
