use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::models::{
    Customer, CustomerSalesData, DiscountRequest, DiscountRequestPatch, NewCustomer,
    NewCustomerSalesData, NewDiscountRequest, NewRegionalData, PatchedRequest, RegionalData,
};
use crate::services::filter::FilterCriteria;

pub mod memory;
pub mod seed;

pub use memory::InMemoryStorage;

pub type StorageResult<T> = Result<T, ServiceError>;

/// Record store behind the HTTP handlers.
///
/// Lookups that match nothing return `Ok(None)` or an empty list; errors are
/// reserved for the store itself failing. List operations return records in
/// insertion order.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_customer(&self, id: &str) -> StorageResult<Option<Customer>>;
    async fn list_customers(&self) -> StorageResult<Vec<Customer>>;
    async fn create_customer(&self, new: NewCustomer) -> StorageResult<Customer>;

    async fn get_discount_request(&self, id: &str) -> StorageResult<Option<DiscountRequest>>;
    async fn list_discount_requests(&self) -> StorageResult<Vec<DiscountRequest>>;
    async fn list_discount_requests_filtered(
        &self,
        criteria: &FilterCriteria,
    ) -> StorageResult<Vec<DiscountRequest>>;
    /// Status is forced to pending; region defaults to "Oman".
    async fn create_discount_request(
        &self,
        new: NewDiscountRequest,
    ) -> StorageResult<DiscountRequest>;
    /// Merges `patch` and refreshes `updatedAt`, returning the status the record
    /// had before the merge. `Ok(None)` when the id is unknown, `InvalidStatus`
    /// when the patch would move a decided request.
    async fn update_discount_request(
        &self,
        id: &str,
        patch: DiscountRequestPatch,
    ) -> StorageResult<Option<PatchedRequest>>;

    async fn get_regional_data(&self, region: &str) -> StorageResult<Vec<RegionalData>>;
    async fn create_regional_data(&self, new: NewRegionalData) -> StorageResult<RegionalData>;

    async fn get_customer_sales_data(
        &self,
        customer_id: &str,
    ) -> StorageResult<Vec<CustomerSalesData>>;
    async fn create_customer_sales_data(
        &self,
        new: NewCustomerSalesData,
    ) -> StorageResult<CustomerSalesData>;
}
