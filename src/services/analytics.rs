use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum::{Display, IntoEnumIterator};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::{
    errors::ServiceError,
    models::{
        Customer, CustomerSalesData, Demand, DiscountRequest, InventoryStatus, Month, Product,
        RegionalData, RequestStatus, RequestWithCustomer,
    },
    repositories::Storage,
    services::filter::FilterCriteria,
};

/// Projection constants shown alongside every non-empty margin analysis.
pub const REVENUE_GROWTH_PERCENT: Decimal = dec!(15.3);
pub const BREAKEVEN_PERCENT: Decimal = dec!(8.5);
pub const ROI_IMPACT_PERCENT: Decimal = dec!(12.3);
pub const PAYBACK_PERIOD_MONTHS: Decimal = dec!(14);

/// Monthly margin history, Jan..Dec, percent.
pub const HISTORICAL_MARGINS: [Decimal; 12] = [
    dec!(15.2),
    dec!(14.8),
    dec!(16.1),
    dec!(15.5),
    dec!(14.9),
    dec!(15.8),
    dec!(16.2),
    dec!(15.4),
    dec!(14.7),
    dec!(15.9),
    dec!(16.3),
    dec!(15.1),
];

const TREND_LOSS_FACTOR: Decimal = dec!(0.1);

const COMPETITION_CAP: Decimal = dec!(65);
const COMPETITION_PER_DISCOUNT_POINT: Decimal = dec!(4);
const RETENTION_FLOOR: Decimal = dec!(30);
const RETENTION_PER_DISCOUNT_POINT: Decimal = dec!(2);
const VOLUME_CAP: Decimal = dec!(85);
const VOLUME_PER_REQUEST: Decimal = dec!(20);
const VOLUME_BASE: Decimal = dec!(25);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_requests: usize,
    pub pending_requests: usize,
    /// Sum of order values over pending requests only
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 1555000.0)]
    pub total_value: Decimal,
    pub approved_requests: usize,
    pub rejected_requests: usize,
}

/// Financial effect of granting a selection of requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarginAnalysis {
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_order_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub avg_discount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub current_loss: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub projected_revenue: Decimal,
    /// Same value as `avg_discount`
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub current_loss_percent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub revenue_growth: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub breakeven: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub roi_impact: Decimal,
    /// Months
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub payback_period: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

/// Bucket for levels where higher means riskier.
fn bucket(level: Decimal, high_above: Decimal, medium_above: Decimal) -> RiskLevel {
    if level > high_above {
        RiskLevel::High
    } else if level > medium_above {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// 0..=65
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub competition_level: Decimal,
    /// 30..=100, higher is safer
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub retention_level: Decimal,
    /// 25..=85
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub volume_impact: Decimal,
    pub competition_risk: RiskLevel,
    pub retention_risk: RiskLevel,
    pub volume_risk: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarginTrendPoint {
    pub month: Month,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub historical: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub projected: Decimal,
}

/// Response of `POST /api/analytics/margin-impact`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarginImpactReport {
    pub analysis: MarginAnalysis,
    pub risk: RiskAssessment,
    pub trend: Vec<MarginTrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySales {
    pub month: Month,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product: Product,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub customer: Customer,
    /// Jan..Dec; months without sales are 0
    pub monthly_sales: Vec<MonthlySales>,
    /// In first-seen order
    pub product_sales: Vec<ProductSales>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegionalProductSummary {
    pub product: Product,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub margin: Option<Decimal>,
    pub demand: Option<Demand>,
    #[schema(example = "↑")]
    pub demand_trend: String,
    pub demand_score: u8,
    /// Missing values are reported as 0
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub capacity_utilization: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub inventory_level: Option<Decimal>,
    pub inventory_status: Option<InventoryStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegionalContext {
    pub region: String,
    pub products: Vec<RegionalProductSummary>,
}

pub(crate) fn overflow(what: &str) -> ServiceError {
    ServiceError::InternalError(format!("{} overflowed", what))
}

/// Sums `values`, reporting an `InternalError` when the total leaves the
/// `Decimal` range.
pub fn checked_sum(
    values: impl IntoIterator<Item = Decimal>,
    what: &str,
) -> Result<Decimal, ServiceError> {
    values.into_iter().try_fold(Decimal::ZERO, |total, value| {
        total.checked_add(value).ok_or_else(|| overflow(what))
    })
}

pub fn dashboard_stats(requests: &[DiscountRequest]) -> Result<DashboardStats, ServiceError> {
    let count = |status: RequestStatus| requests.iter().filter(|r| r.status == status).count();
    let total_value = checked_sum(
        requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .map(|r| r.order_value),
        "pending order value",
    )?;
    Ok(DashboardStats {
        total_requests: requests.len(),
        pending_requests: count(RequestStatus::Pending),
        total_value,
        approved_requests: count(RequestStatus::Approved),
        rejected_requests: count(RequestStatus::Rejected),
    })
}

/// Unweighted mean of the requested discounts; 0 for an empty selection.
pub fn average_discount<'a>(
    selection: impl IntoIterator<Item = &'a DiscountRequest>,
) -> Result<Decimal, ServiceError> {
    let mut count = 0u32;
    let sum = checked_sum(
        selection.into_iter().map(|r| {
            count += 1;
            r.discount_percentage
        }),
        "discount total",
    )?;
    if count == 0 {
        Ok(Decimal::ZERO)
    } else {
        Ok(sum / Decimal::from(count))
    }
}

/// Sum of `orderValue × discount / 100`.
pub fn total_margin_impact<'a>(
    selection: impl IntoIterator<Item = &'a DiscountRequest>,
) -> Result<Decimal, ServiceError> {
    selection.into_iter().try_fold(Decimal::ZERO, |total, r| {
        total
            .checked_add(r.margin_impact()?)
            .ok_or_else(|| overflow("margin impact total"))
    })
}

/// An empty selection yields all zeros, placeholder constants included.
pub fn margin_analysis(selection: &[DiscountRequest]) -> Result<MarginAnalysis, ServiceError> {
    if selection.is_empty() {
        return Ok(MarginAnalysis::default());
    }

    let total_order_value = checked_sum(selection.iter().map(|r| r.order_value), "order value")?;
    let avg_discount = average_discount(selection)?;
    let current_loss = total_order_value
        .checked_mul(avg_discount)
        .and_then(|value| value.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| overflow("current loss"))?;
    let projected_revenue = total_order_value
        .checked_sub(current_loss)
        .ok_or_else(|| overflow("projected revenue"))?;

    Ok(MarginAnalysis {
        total_order_value,
        avg_discount,
        current_loss,
        projected_revenue,
        current_loss_percent: avg_discount,
        revenue_growth: REVENUE_GROWTH_PERCENT,
        breakeven: BREAKEVEN_PERCENT,
        roi_impact: ROI_IMPACT_PERCENT,
        payback_period: PAYBACK_PERIOD_MONTHS,
    })
}

/// Levels stay within their bounds for any input: the average discount is
/// clamped to 0..=100 before scoring.
pub fn risk_assessment(selection: &[DiscountRequest]) -> Result<RiskAssessment, ServiceError> {
    let avg_discount = average_discount(selection)?.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    let competition_level = (avg_discount * COMPETITION_PER_DISCOUNT_POINT).min(COMPETITION_CAP);
    let retention_level =
        (Decimal::ONE_HUNDRED - avg_discount * RETENTION_PER_DISCOUNT_POINT).max(RETENTION_FLOOR);
    let volume_impact =
        (Decimal::from(selection.len()) * VOLUME_PER_REQUEST + VOLUME_BASE).min(VOLUME_CAP);

    // Retention is inverted: a high level means low risk.
    let retention_risk = match bucket(retention_level, dec!(70), dec!(40)) {
        RiskLevel::High => RiskLevel::Low,
        RiskLevel::Medium => RiskLevel::Medium,
        RiskLevel::Low => RiskLevel::High,
    };

    Ok(RiskAssessment {
        competition_level,
        retention_level,
        volume_impact,
        competition_risk: bucket(competition_level, dec!(60), dec!(30)),
        retention_risk,
        volume_risk: bucket(volume_impact, dec!(70), dec!(40)),
    })
}

pub fn margin_trend(current_loss_percent: Decimal) -> Vec<MarginTrendPoint> {
    Month::iter()
        .zip(HISTORICAL_MARGINS)
        .map(|(month, historical)| MarginTrendPoint {
            month,
            historical,
            projected: historical - current_loss_percent * TREND_LOSS_FACTOR,
        })
        .collect()
}

pub fn margin_impact_report(
    selection: &[DiscountRequest],
) -> Result<MarginImpactReport, ServiceError> {
    let analysis = margin_analysis(selection)?;
    let trend = margin_trend(analysis.current_loss_percent);
    Ok(MarginImpactReport {
        risk: risk_assessment(selection)?,
        analysis,
        trend,
    })
}

pub fn customer_profile(
    customer: Customer,
    sales: &[CustomerSalesData],
) -> Result<CustomerProfile, ServiceError> {
    let mut by_month: HashMap<Month, Decimal> = HashMap::new();
    let mut product_sales: Vec<ProductSales> = Vec::new();

    for row in sales {
        let month_total = by_month.entry(row.month).or_default();
        *month_total = month_total
            .checked_add(row.sales)
            .ok_or_else(|| overflow("monthly sales"))?;
        match product_sales.iter_mut().find(|p| p.product == row.product) {
            Some(entry) => {
                entry.total = entry
                    .total
                    .checked_add(row.sales)
                    .ok_or_else(|| overflow("product sales"))?
            }
            None => product_sales.push(ProductSales {
                product: row.product,
                total: row.sales,
            }),
        }
    }

    let monthly_sales = Month::iter()
        .map(|month| MonthlySales {
            month,
            total: by_month.get(&month).copied().unwrap_or_default(),
        })
        .collect();

    Ok(CustomerProfile {
        customer,
        monthly_sales,
        product_sales,
    })
}

pub fn regional_context(region: &str, rows: &[RegionalData]) -> RegionalContext {
    let products = rows
        .iter()
        .map(|row| RegionalProductSummary {
            product: row.product,
            margin: row.margin,
            demand: row.demand,
            demand_trend: row
                .demand
                .map_or("→", |demand| demand.trend_symbol())
                .to_string(),
            demand_score: row.demand.map_or(Demand::Medium.score(), |d| d.score()),
            capacity_utilization: row.capacity_utilization.unwrap_or_default(),
            inventory_level: row.inventory_level,
            inventory_status: row.inventory_status,
        })
        .collect();

    RegionalContext {
        region: region.to_string(),
        products,
    }
}

/// Pairs each request with its customer, keeping request order.
pub fn join_customers(
    requests: Vec<DiscountRequest>,
    customers: &[Customer],
) -> Vec<RequestWithCustomer> {
    let by_id: HashMap<&str, &Customer> = customers.iter().map(|c| (c.id.as_str(), c)).collect();
    requests
        .into_iter()
        .map(|request| {
            let customer = by_id.get(request.customer_id.as_str()).copied();
            RequestWithCustomer::join(request, customer)
        })
        .collect()
}

/// Store-backed entry points for the analytics endpoints.
#[derive(Clone)]
pub struct AnalyticsService {
    storage: Arc<dyn Storage>,
}

impl AnalyticsService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ServiceError> {
        let requests = self.storage.list_discount_requests().await?;
        dashboard_stats(&requests)
    }

    /// Unknown ids are ignored; the selection keeps store order.
    pub async fn margin_impact(&self, ids: &[String]) -> Result<MarginImpactReport, ServiceError> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let selection: Vec<DiscountRequest> = self
            .storage
            .list_discount_requests()
            .await?
            .into_iter()
            .filter(|r| wanted.contains(r.id.as_str()))
            .collect();
        debug!(
            requested = ids.len(),
            matched = selection.len(),
            "computing margin impact"
        );
        margin_impact_report(&selection)
    }

    pub async fn customer_profile(&self, customer_id: &str) -> Result<CustomerProfile, ServiceError> {
        let customer = self
            .storage
            .get_customer(customer_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", customer_id)))?;
        let sales = self.storage.get_customer_sales_data(customer_id).await?;
        info!(customer_id, rows = sales.len(), "building customer profile");
        customer_profile(customer, &sales)
    }

    pub async fn regional_context(&self, region: &str) -> Result<RegionalContext, ServiceError> {
        let rows = self.storage.get_regional_data(region).await?;
        Ok(regional_context(region, &rows))
    }

    pub async fn requests_with_customers(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<RequestWithCustomer>, ServiceError> {
        let requests = self.storage.list_discount_requests_filtered(criteria).await?;
        let customers = self.storage.list_customers().await?;
        Ok(join_customers(requests, &customers))
    }

    /// Joined view of a single request, regardless of any filter.
    pub async fn request_with_customer(
        &self,
        request_id: &str,
    ) -> Result<RequestWithCustomer, ServiceError> {
        let request = self
            .storage
            .get_discount_request(request_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Discount request {} not found", request_id))
            })?;
        let customer = self.storage.get_customer(&request.customer_id).await?;
        Ok(RequestWithCustomer::join(request, customer.as_ref()))
    }
}
