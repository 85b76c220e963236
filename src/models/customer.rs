use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use validator::Validate;

/// Commercial tier of a customer account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum CustomerTier {
    Premium,
    Gold,
    Silver,
}

/// A customer account. Reference data: seeded once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[schema(example = "customer-1-arabian-steel")]
    pub id: String,
    #[schema(example = "Arabian Steel Co.")]
    pub name: String,
    pub tier: CustomerTier,
    /// Average monthly sales in OMR
    #[schema(value_type = Option<String>, example = "1250000")]
    pub avg_monthly_sales: Option<Decimal>,
    /// Average granted discount, percent
    #[schema(value_type = Option<String>, example = "9.2")]
    pub avg_discount: Option<Decimal>,
    /// Year-over-year sales trend, percent
    #[schema(value_type = Option<String>, example = "12.0")]
    pub sales_trend: Option<Decimal>,
    /// Year-over-year discount trend, percent
    #[schema(value_type = Option<String>, example = "2.1")]
    pub discount_trend: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

/// Insert form of [`Customer`]; id and timestamp are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCustomer {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub tier: CustomerTier,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub avg_monthly_sales: Option<Decimal>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub avg_discount: Option<Decimal>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub sales_trend: Option<Decimal>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub discount_trend: Option<Decimal>,
}

impl NewCustomer {
    pub fn into_customer(self, id: String, created_at: DateTime<Utc>) -> Customer {
        Customer {
            id,
            name: self.name,
            tier: self.tier,
            avg_monthly_sales: self.avg_monthly_sales,
            avg_discount: self.avg_discount,
            sales_trend: self.sales_trend,
            discount_trend: self.discount_trend,
            created_at,
        }
    }
}
