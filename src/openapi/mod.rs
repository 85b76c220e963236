use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Discount Desk API",
        version = "0.2.1",
        description = r#"
# Discount Desk API

Review desk for steel-product discount requests.

## Features

- **Discount Requests**: list, filter, approve or reject (single and bulk)
- **Customers**: customer records, monthly sales and profiles
- **Regional Data**: per-region margin, demand and inventory context
- **Analytics**: dashboard counts, margin impact, risk and margin trend
- **Assistant**: canned answers to common pricing questions

## Error Handling

Failing requests return a consistent body:

```json
{
  "error": "Bad Request",
  "message": "Invalid request data",
  "details": ["discountPercentage: range"],
  "request_id": "req-abc123",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Discount Requests", description = "Discount request review endpoints"),
        (name = "Customers", description = "Customer and sales endpoints"),
        (name = "Regional Data", description = "Regional supply and demand endpoints"),
        (name = "Dashboard", description = "Dashboard statistics"),
        (name = "Analytics", description = "Margin impact analysis"),
        (name = "Assistant", description = "Pricing question answering")
    ),
    paths(
        // Discount requests
        crate::handlers::discount_requests::list_discount_requests,
        crate::handlers::discount_requests::list_filtered_discount_requests,
        crate::handlers::discount_requests::list_discount_requests_with_customers,
        crate::handlers::discount_requests::update_discount_request,
        crate::handlers::discount_requests::bulk_update_discount_requests,

        // Customers
        crate::handlers::customers::list_customers,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::get_customer_sales_data,
        crate::handlers::customers::get_customer_profile,

        // Regional data
        crate::handlers::regional::get_regional_data,
        crate::handlers::regional::get_regional_context,

        // Dashboard, analytics and assistant
        crate::handlers::dashboard::get_dashboard_stats,
        crate::handlers::analytics::margin_impact,
        crate::handlers::assistant::query_assistant,
    ),
    components(
        schemas(
            // Records
            crate::models::Customer,
            crate::models::CustomerTier,
            crate::models::CustomerSalesData,
            crate::models::Month,
            crate::models::DiscountRequest,
            crate::models::DiscountRequestPatch,
            crate::models::RequestWithCustomer,
            crate::models::Product,
            crate::models::RequestStage,
            crate::models::Priority,
            crate::models::RequestStatus,
            crate::models::RegionalData,
            crate::models::Demand,
            crate::models::InventoryStatus,

            // Filtering and review
            crate::services::filter::FilterCriteria,
            crate::services::review::BulkStatusUpdate,
            crate::services::review::BulkUpdateResponse,

            // Analytics
            crate::services::analytics::DashboardStats,
            crate::services::analytics::MarginAnalysis,
            crate::services::analytics::RiskLevel,
            crate::services::analytics::RiskAssessment,
            crate::services::analytics::MarginTrendPoint,
            crate::services::analytics::MarginImpactReport,
            crate::services::analytics::MonthlySales,
            crate::services::analytics::ProductSales,
            crate::services::analytics::CustomerProfile,
            crate::services::analytics::RegionalProductSummary,
            crate::services::analytics::RegionalContext,
            crate::handlers::analytics::MarginImpactRequest,

            // Assistant
            crate::handlers::assistant::AssistantQuery,
            crate::services::assistant::AssistantReply,
            crate::services::assistant::Intent,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

/// Serves the generated document at `/api-docs/openapi.json`.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
