use crate::errors::{ErrorResponse, ServiceError};
use crate::models::{Customer, CustomerSalesData};
use crate::services::analytics::CustomerProfile;
use crate::AppState;
use axum::{
    extract::{Json, Path, State},
    routing::get,
    Router,
};

#[utoipa::path(
    get,
    path = "/api/customers",
    responses((status = 200, description = "All customers", body = [Customer])),
    tag = "Customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Customer>>, ServiceError> {
    Ok(Json(state.storage.list_customers().await?))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(("id" = String, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer found", body = Customer),
        (status = 404, description = "Customer not found", body = ErrorResponse),
    ),
    tag = "Customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Customer>, ServiceError> {
    state
        .storage
        .get_customer(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", id)))
}

/// Monthly sales rows for a customer; empty when there are none
#[utoipa::path(
    get,
    path = "/api/customers/{id}/sales-data",
    params(("id" = String, Path, description = "Customer id")),
    responses((status = 200, description = "Sales rows", body = [CustomerSalesData])),
    tag = "Customers"
)]
pub async fn get_customer_sales_data(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CustomerSalesData>>, ServiceError> {
    Ok(Json(state.storage.get_customer_sales_data(&id).await?))
}

/// Customer record with monthly and per-product sales totals
#[utoipa::path(
    get,
    path = "/api/customers/{id}/profile",
    params(("id" = String, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer profile", body = CustomerProfile),
        (status = 404, description = "Customer not found", body = ErrorResponse),
    ),
    tag = "Customers"
)]
pub async fn get_customer_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CustomerProfile>, ServiceError> {
    Ok(Json(state.services.analytics.customer_profile(&id).await?))
}

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers))
        .route("/customers/:id", get(get_customer))
        .route("/customers/:id/sales-data", get(get_customer_sales_data))
        .route("/customers/:id/profile", get(get_customer_profile))
}
