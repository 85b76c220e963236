//! Demo fixtures loaded at startup.
//!
//! Customers, requests and regional rows are fixed. Monthly sales history is
//! generated from a seeded RNG, so the same seed always yields the same rows.

use chrono::{DateTime, NaiveDate, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use strum::IntoEnumIterator;

use crate::models::{
    Customer, CustomerSalesData, CustomerTier, Demand, DiscountRequest, InventoryStatus, Month,
    Priority, Product, RegionalData, RequestStage, RequestStatus, DEFAULT_REGION,
};

pub const ARABIAN_STEEL: &str = "customer-1-arabian-steel";
pub const GULF_METAL: &str = "customer-2-gulf-metal";
pub const OMAN_CONSTRUCTION: &str = "customer-3-oman-construction";

pub const ARABIAN_WIRE_REQUEST: &str = "request-1-arabian-wire";
pub const GULF_REBAR_REQUEST: &str = "request-2-gulf-rebar";
pub const OMAN_BILLETS_REQUEST: &str = "request-3-oman-billets";

/// Generated monthly sales: `uniform[0, SPREAD) + BASE + customer index × STEP`.
const SALES_SPREAD: f64 = 200_000.0;
const SALES_BASE: f64 = 50_000.0;
const SALES_STEP: f64 = 100_000.0;

#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    pub customers: Vec<Customer>,
    pub discount_requests: Vec<DiscountRequest>,
    pub regional_data: Vec<RegionalData>,
    pub sales_data: Vec<CustomerSalesData>,
}

fn fixture_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

pub fn fixtures(seed: u64) -> Fixtures {
    let customers = customers();
    let sales_data = sales_history(&customers, seed);
    Fixtures {
        discount_requests: discount_requests(),
        regional_data: regional_data(),
        sales_data,
        customers,
    }
}

fn customers() -> Vec<Customer> {
    let created_at = fixture_date(2024, 1, 1);
    let customer = |id: &str,
                    name: &str,
                    tier: CustomerTier,
                    sales: Decimal,
                    discount: Decimal,
                    sales_trend: Decimal,
                    discount_trend: Decimal| Customer {
        id: id.to_string(),
        name: name.to_string(),
        tier,
        avg_monthly_sales: Some(sales),
        avg_discount: Some(discount),
        sales_trend: Some(sales_trend),
        discount_trend: Some(discount_trend),
        created_at,
    };

    vec![
        customer(
            ARABIAN_STEEL,
            "Arabian Steel Co.",
            CustomerTier::Premium,
            dec!(1250000),
            dec!(9.2),
            dec!(12.0),
            dec!(2.1),
        ),
        customer(
            GULF_METAL,
            "Gulf Metal Industries",
            CustomerTier::Gold,
            dec!(950000),
            dec!(7.8),
            dec!(8.5),
            dec!(-1.2),
        ),
        customer(
            OMAN_CONSTRUCTION,
            "Oman Construction Ltd",
            CustomerTier::Silver,
            dec!(650000),
            dec!(12.5),
            dec!(15.2),
            dec!(3.8),
        ),
    ]
}

fn discount_requests() -> Vec<DiscountRequest> {
    let request = |id: &str,
                   customer_id: &str,
                   product: Product,
                   grade: &str,
                   discount: Decimal,
                   value: Decimal,
                   stage: RequestStage,
                   priority: Priority,
                   day: u32| {
        let at = fixture_date(2024, 1, day);
        DiscountRequest {
            id: id.to_string(),
            customer_id: customer_id.to_string(),
            product,
            grade: grade.to_string(),
            discount_percentage: discount,
            order_value: value,
            stage,
            priority,
            status: RequestStatus::Pending,
            region: DEFAULT_REGION.to_string(),
            created_at: at,
            updated_at: at,
        }
    };

    vec![
        request(
            ARABIAN_WIRE_REQUEST,
            ARABIAN_STEEL,
            Product::WireRod,
            "A500",
            dec!(12.5),
            dec!(485000),
            RequestStage::Negotiation,
            Priority::High,
            15,
        ),
        request(
            GULF_REBAR_REQUEST,
            GULF_METAL,
            Product::Rebar,
            "B450",
            dec!(8.2),
            dec!(720000),
            RequestStage::ReadyToClose,
            Priority::Medium,
            16,
        ),
        request(
            OMAN_BILLETS_REQUEST,
            OMAN_CONSTRUCTION,
            Product::Billets,
            "150x150mm",
            dec!(15.0),
            dec!(350000),
            RequestStage::Inquiry,
            Priority::Low,
            17,
        ),
    ]
}

fn regional_data() -> Vec<RegionalData> {
    let updated_at = fixture_date(2024, 1, 1);
    let row = |product: Product,
               margin: Decimal,
               demand: Demand,
               capacity: Decimal,
               inventory: Decimal,
               status: InventoryStatus| RegionalData {
        id: format!("regional-oman-{}", product.keyword().replace(' ', "-")),
        region: DEFAULT_REGION.to_string(),
        product,
        margin: Some(margin),
        demand: Some(demand),
        capacity_utilization: Some(capacity),
        inventory_level: Some(inventory),
        inventory_status: Some(status),
        updated_at,
    };

    vec![
        row(
            Product::WireRod,
            dec!(12.5),
            Demand::High,
            dec!(85),
            dec!(2450),
            InventoryStatus::Low,
        ),
        row(
            Product::Rebar,
            dec!(15.2),
            Demand::Stable,
            dec!(92),
            dec!(8320),
            InventoryStatus::Optimal,
        ),
        row(
            Product::Billets,
            dec!(8.7),
            Demand::Low,
            dec!(78),
            dec!(5100),
            InventoryStatus::Medium,
        ),
    ]
}

fn sales_history(customers: &[Customer], seed: u64) -> Vec<CustomerSalesData> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(customers.len() * 12 * 3);

    for (index, customer) in customers.iter().enumerate() {
        for month in Month::iter() {
            for product in Product::iter() {
                let raw = rng.gen_range(0.0..SALES_SPREAD) + SALES_BASE + index as f64 * SALES_STEP;
                let sales = Decimal::from_f64(raw).unwrap_or_default().round_dp(2);
                rows.push(CustomerSalesData {
                    id: CustomerSalesData::row_id(&customer.id, month, product),
                    customer_id: customer.id.clone(),
                    month,
                    product,
                    sales,
                    created_at: customer.created_at,
                });
            }
        }
    }

    rows
}
