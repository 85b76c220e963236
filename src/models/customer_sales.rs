use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use utoipa::ToSchema;
use validator::Validate;

use super::discount_request::Product;

/// Calendar month, serialized as its three-letter abbreviation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

/// One customer × month × product sales figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSalesData {
    #[schema(example = "sales-customer-1-arabian-steel-jan-wire-rod")]
    pub id: String,
    pub customer_id: String,
    pub month: Month,
    pub product: Product,
    /// OMR
    pub sales: Decimal,
    pub created_at: DateTime<Utc>,
}

impl CustomerSalesData {
    /// Id of the form `sales-{customer}-{month}-{product}`, lower-cased with
    /// whitespace turned into dashes.
    pub fn row_id(customer_id: &str, month: Month, product: Product) -> String {
        format!("sales-{}-{}-{}", customer_id, month, product)
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCustomerSalesData {
    #[validate(length(min = 1))]
    pub customer_id: String,
    pub month: Month,
    pub product: Product,
    pub sales: Decimal,
}

impl NewCustomerSalesData {
    pub fn into_sales_data(self, created_at: DateTime<Utc>) -> CustomerSalesData {
        CustomerSalesData {
            id: CustomerSalesData::row_id(&self.customer_id, self.month, self.product),
            customer_id: self.customer_id,
            month: self.month,
            product: self.product,
            sales: self.sales,
            created_at,
        }
    }
}
