use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::seed::Fixtures;
use super::{Storage, StorageResult};
use crate::models::{
    generate_id, Customer, CustomerSalesData, DiscountRequest, DiscountRequestPatch, NewCustomer,
    NewCustomerSalesData, NewDiscountRequest, NewRegionalData, PatchedRequest, RegionalData,
};
use crate::services::filter::FilterCriteria;

/// Rows kept in insertion order with an id index.
#[derive(Debug, Clone)]
struct Table<T> {
    rows: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Clone> Table<T> {
    /// Replaces the row in place when the id already exists.
    fn upsert(&mut self, id: String, row: T) {
        match self.index.get(&id).copied() {
            Some(pos) => {
                if let Some(slot) = self.rows.get_mut(pos) {
                    *slot = row;
                }
            }
            None => {
                self.index.insert(id, self.rows.len());
                self.rows.push(row);
            }
        }
    }

    fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).and_then(|&pos| self.rows.get(pos))
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        let pos = *self.index.get(id)?;
        self.rows.get_mut(pos)
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.iter()
    }
}

#[derive(Debug, Default)]
struct Tables {
    customers: Table<Customer>,
    discount_requests: Table<DiscountRequest>,
    regional_data: Table<RegionalData>,
    sales_data: Table<CustomerSalesData>,
}

/// Process-memory store. Cloning shares the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStorage {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `fixtures`.
    pub fn with_fixtures(fixtures: Fixtures) -> Self {
        let mut tables = Tables::default();
        for customer in fixtures.customers {
            tables.customers.upsert(customer.id.clone(), customer);
        }
        for request in fixtures.discount_requests {
            tables.discount_requests.upsert(request.id.clone(), request);
        }
        for row in fixtures.regional_data {
            tables.regional_data.upsert(row.id.clone(), row);
        }
        for row in fixtures.sales_data {
            tables.sales_data.upsert(row.id.clone(), row);
        }
        info!(
            customers = tables.customers.rows.len(),
            discount_requests = tables.discount_requests.rows.len(),
            regional_rows = tables.regional_data.rows.len(),
            sales_rows = tables.sales_data.rows.len(),
            "in-memory store seeded"
        );
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    /// Store seeded with the demo fixtures generated from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::with_fixtures(super::seed::fixtures(seed))
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn get_customer(&self, id: &str) -> StorageResult<Option<Customer>> {
        Ok(self.tables.read().await.customers.get(id).cloned())
    }

    async fn list_customers(&self) -> StorageResult<Vec<Customer>> {
        Ok(self.tables.read().await.customers.iter().cloned().collect())
    }

    async fn create_customer(&self, new: NewCustomer) -> StorageResult<Customer> {
        let customer = new.into_customer(generate_id("customer"), Utc::now());
        self.tables
            .write()
            .await
            .customers
            .upsert(customer.id.clone(), customer.clone());
        debug!(customer_id = %customer.id, "customer created");
        Ok(customer)
    }

    async fn get_discount_request(&self, id: &str) -> StorageResult<Option<DiscountRequest>> {
        Ok(self.tables.read().await.discount_requests.get(id).cloned())
    }

    async fn list_discount_requests(&self) -> StorageResult<Vec<DiscountRequest>> {
        Ok(self
            .tables
            .read()
            .await
            .discount_requests
            .iter()
            .cloned()
            .collect())
    }

    async fn list_discount_requests_filtered(
        &self,
        criteria: &FilterCriteria,
    ) -> StorageResult<Vec<DiscountRequest>> {
        Ok(self
            .tables
            .read()
            .await
            .discount_requests
            .iter()
            .filter(|request| criteria.matches(request))
            .cloned()
            .collect())
    }

    async fn create_discount_request(
        &self,
        new: NewDiscountRequest,
    ) -> StorageResult<DiscountRequest> {
        let request = new.into_request(generate_id("request"), Utc::now());
        self.tables
            .write()
            .await
            .discount_requests
            .upsert(request.id.clone(), request.clone());
        debug!(request_id = %request.id, "discount request created");
        Ok(request)
    }

    async fn update_discount_request(
        &self,
        id: &str,
        patch: DiscountRequestPatch,
    ) -> StorageResult<Option<PatchedRequest>> {
        let mut tables = self.tables.write().await;
        let Some(request) = tables.discount_requests.get_mut(id) else {
            return Ok(None);
        };
        let previous_status = request.status;
        request.apply_patch(patch, Utc::now())?;
        Ok(Some(PatchedRequest {
            previous_status,
            request: request.clone(),
        }))
    }

    async fn get_regional_data(&self, region: &str) -> StorageResult<Vec<RegionalData>> {
        Ok(self
            .tables
            .read()
            .await
            .regional_data
            .iter()
            .filter(|row| row.region == region)
            .cloned()
            .collect())
    }

    async fn create_regional_data(&self, new: NewRegionalData) -> StorageResult<RegionalData> {
        let row = new.into_regional_data(generate_id("regional"), Utc::now());
        self.tables
            .write()
            .await
            .regional_data
            .upsert(row.id.clone(), row.clone());
        Ok(row)
    }

    async fn get_customer_sales_data(
        &self,
        customer_id: &str,
    ) -> StorageResult<Vec<CustomerSalesData>> {
        Ok(self
            .tables
            .read()
            .await
            .sales_data
            .iter()
            .filter(|row| row.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn create_customer_sales_data(
        &self,
        new: NewCustomerSalesData,
    ) -> StorageResult<CustomerSalesData> {
        let row = new.into_sales_data(Utc::now());
        self.tables
            .write()
            .await
            .sales_data
            .upsert(row.id.clone(), row.clone());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ServiceError;
    use crate::models::{
        CustomerTier, Month, Priority, Product, RequestStage, RequestStatus, DEFAULT_REGION,
    };
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn new_request(customer_id: &str, value: rust_decimal::Decimal) -> NewDiscountRequest {
        NewDiscountRequest {
            customer_id: customer_id.into(),
            product: Product::Rebar,
            grade: "B450".into(),
            discount_percentage: dec!(10),
            order_value: value,
            stage: RequestStage::Inquiry,
            priority: Priority::Low,
            region: None,
        }
    }

    #[tokio::test]
    async fn created_requests_are_pending_and_listed_in_order() {
        let storage = InMemoryStorage::new();
        let first = storage
            .create_discount_request(new_request("c-1", dec!(100)))
            .await
            .unwrap();
        let second = storage
            .create_discount_request(new_request("c-2", dec!(200)))
            .await
            .unwrap();

        assert_eq!(first.status, RequestStatus::Pending);
        assert_eq!(first.region, DEFAULT_REGION);

        let ids: Vec<String> = storage
            .list_discount_requests()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn unknown_ids_yield_none() {
        let storage = InMemoryStorage::new();
        assert!(storage.get_customer("nope").await.unwrap().is_none());
        assert!(storage.get_discount_request("nope").await.unwrap().is_none());
        let updated = storage
            .update_discount_request("nope", DiscountRequestPatch::status(RequestStatus::Approved))
            .await
            .unwrap();
        assert!(updated.is_none());
        assert!(storage.get_customer_sales_data("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_merges_patch_and_persists() {
        let storage = InMemoryStorage::new();
        let created = storage
            .create_discount_request(new_request("c-1", dec!(100)))
            .await
            .unwrap();

        let patch = DiscountRequestPatch {
            status: Some(RequestStatus::Approved),
            grade: Some("B500".into()),
            ..Default::default()
        };
        let patched = storage
            .update_discount_request(&created.id, patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(patched.previous_status, RequestStatus::Pending);
        let updated = patched.request;
        assert_eq!(updated.status, RequestStatus::Approved);
        assert_eq!(updated.grade, "B500");
        assert!(updated.updated_at >= created.updated_at);

        let stored = storage.get_discount_request(&created.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn concurrent_updates_see_the_status_each_one_replaced() {
        let storage = InMemoryStorage::new();
        let created = storage
            .create_discount_request(new_request("c-1", dec!(100)))
            .await
            .unwrap();

        let outcomes = futures::future::join_all((0..4).map(|_| {
            storage.update_discount_request(
                &created.id,
                DiscountRequestPatch::status(RequestStatus::Approved),
            )
        }))
        .await;

        let previous: Vec<RequestStatus> = outcomes
            .into_iter()
            .map(|outcome| outcome.unwrap().unwrap().previous_status)
            .collect();
        assert_eq!(
            previous
                .iter()
                .filter(|status| **status == RequestStatus::Pending)
                .count(),
            1
        );
        assert_eq!(
            previous
                .iter()
                .filter(|status| **status == RequestStatus::Approved)
                .count(),
            3
        );
    }

    #[tokio::test]
    async fn decided_requests_refuse_other_statuses() {
        let storage = InMemoryStorage::new();
        let created = storage
            .create_discount_request(new_request("c-1", dec!(100)))
            .await
            .unwrap();
        storage
            .update_discount_request(&created.id, DiscountRequestPatch::status(RequestStatus::Rejected))
            .await
            .unwrap();

        let result = storage
            .update_discount_request(&created.id, DiscountRequestPatch::status(RequestStatus::Approved))
            .await;
        assert_matches!(result, Err(ServiceError::InvalidStatus(_)));

        let stored = storage.get_discount_request(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Rejected);
    }

    #[tokio::test]
    async fn filtered_listing_uses_value_bounds() {
        let storage = InMemoryStorage::new();
        for value in [dec!(100), dec!(250), dec!(400)] {
            storage
                .create_discount_request(new_request("c-1", value))
                .await
                .unwrap();
        }
        let criteria = FilterCriteria {
            min_value: Some(250.0),
            max_value: Some(400.0),
            ..Default::default()
        };
        let values: Vec<_> = storage
            .list_discount_requests_filtered(&criteria)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.order_value)
            .collect();
        assert_eq!(values, vec![dec!(250), dec!(400)]);
    }

    #[tokio::test]
    async fn sales_rows_with_same_key_replace_each_other() {
        let storage = InMemoryStorage::new();
        let customer = storage
            .create_customer(NewCustomer {
                name: "Test Steel".into(),
                tier: CustomerTier::Silver,
                avg_monthly_sales: None,
                avg_discount: None,
                sales_trend: None,
                discount_trend: None,
            })
            .await
            .unwrap();

        for sales in [dec!(10), dec!(20)] {
            storage
                .create_customer_sales_data(NewCustomerSalesData {
                    customer_id: customer.id.clone(),
                    month: Month::Feb,
                    product: Product::Billets,
                    sales,
                })
                .await
                .unwrap();
        }

        let rows = storage.get_customer_sales_data(&customer.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sales, dec!(20));
    }

    #[tokio::test]
    async fn regional_lookup_matches_region_exactly() {
        let storage = InMemoryStorage::seeded(1);
        assert_eq!(storage.get_regional_data("Oman").await.unwrap().len(), 3);
        assert!(storage.get_regional_data("oman").await.unwrap().is_empty());
    }
}
