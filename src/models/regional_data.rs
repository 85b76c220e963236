use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use validator::Validate;

use super::discount_request::Product;

/// Market demand reported for a product in a region.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum Demand {
    High,
    Stable,
    Medium,
    Low,
}

impl Demand {
    /// Score plotted on the supply/demand chart.
    pub fn score(&self) -> u8 {
        match self {
            Demand::High => 90,
            Demand::Stable => 70,
            Demand::Low => 40,
            Demand::Medium => 50,
        }
    }

    pub fn trend_symbol(&self) -> &'static str {
        match self {
            Demand::High => "↑",
            Demand::Low => "↓",
            Demand::Stable | Demand::Medium => "→",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum InventoryStatus {
    Low,
    Optimal,
    Medium,
    High,
}

/// Supply-side snapshot for one region and product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegionalData {
    pub id: String,
    pub region: String,
    pub product: Product,
    /// Percent
    pub margin: Option<Decimal>,
    pub demand: Option<Demand>,
    /// Percent
    pub capacity_utilization: Option<Decimal>,
    /// Tonnes on hand
    pub inventory_level: Option<Decimal>,
    pub inventory_status: Option<InventoryStatus>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewRegionalData {
    #[validate(length(min = 1, max = 100))]
    pub region: String,
    pub product: Product,
    #[serde(default)]
    pub margin: Option<Decimal>,
    #[serde(default)]
    pub demand: Option<Demand>,
    #[serde(default)]
    pub capacity_utilization: Option<Decimal>,
    #[serde(default)]
    pub inventory_level: Option<Decimal>,
    #[serde(default)]
    pub inventory_status: Option<InventoryStatus>,
}

impl NewRegionalData {
    pub fn into_regional_data(self, id: String, updated_at: DateTime<Utc>) -> RegionalData {
        RegionalData {
            id,
            region: self.region,
            product: self.product,
            margin: self.margin,
            demand: self.demand,
            capacity_utilization: self.capacity_utilization,
            inventory_level: self.inventory_level,
            inventory_status: self.inventory_status,
            updated_at,
        }
    }
}
