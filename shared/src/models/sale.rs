//! Sale Model

use serde::{Deserialize, Serialize};

use super::PaymentMethod;

/// One line of a completed sale (names are copied at sale time)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    pub part_id: i64,
    pub part_name: String,
    pub sku: String,
    pub quantity: i64,
    pub unit_price: f64,
    #[serde(default)]
    pub discount: f64,
}

impl SaleItem {
    pub fn line_total(&self) -> f64 {
        crate::money::round_money(self.unit_price * self.quantity as f64 - self.discount)
    }
}

/// Completed sale
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    pub code: String,
    pub branch_id: String,
    pub customer_id: Option<i64>,
    pub customer_name: Option<String>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub items: Vec<SaleItem>,
    pub subtotal: f64,
    pub discount: f64,
    pub vat_rate: f64,
    pub vat_amount: f64,
    pub total: f64,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
    pub created_by: i64,
    pub created_by_name: Option<String>,
    pub created_at: i64,
}

impl Sale {
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// One requested line of a new sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItemInput {
    pub part_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub discount: Option<f64>,
}

/// Create sale payload
///
/// `total`, when present, is the total the client displayed; the server
/// rejects the sale if it does not balance against the computed total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleCreate {
    pub customer_id: Option<i64>,
    pub customer_name: Option<String>,
    pub items: Vec<SaleItemInput>,
    pub discount: Option<f64>,
    pub vat_rate: Option<f64>,
    pub payment_method: Option<PaymentMethod>,
    pub note: Option<String>,
    pub total: Option<f64>,
}

impl SaleCreate {
    pub fn vat_rate_or_default(&self) -> f64 {
        self.vat_rate.unwrap_or(crate::money::DEFAULT_VAT_RATE)
    }
}

/// Result of `sale_create_atomic`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleCreated {
    pub sale: Sale,
    #[serde(default)]
    pub stock: Vec<super::StockLevel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vat_defaults_to_ten_percent() {
        let create: SaleCreate = serde_json::from_value(serde_json::json!({
            "items": [{ "part_id": 1, "quantity": 1, "unit_price": 10.0 }]
        }))
        .unwrap();
        assert_eq!(create.vat_rate_or_default(), 0.1);
        assert!(create.payment_method.is_none());

        let zero: SaleCreate = serde_json::from_value(serde_json::json!({
            "items": [], "vat_rate": 0.0
        }))
        .unwrap();
        assert_eq!(zero.vat_rate_or_default(), 0.0);
    }

    #[test]
    fn line_total_and_item_count() {
        let item = SaleItem {
            part_id: 1,
            part_name: "Spark plug".to_string(),
            sku: "SP-1".to_string(),
            quantity: 3,
            unit_price: 35_000.0,
            discount: 5_000.0,
        };
        assert_eq!(item.line_total(), 100_000.0);

        let items: Vec<SaleItem> =
            serde_json::from_str(r#"[{"part_id":2,"part_name":"Chain","sku":"CH","quantity":2,"unit_price":5.0}]"#)
                .unwrap();
        assert_eq!(items[0].discount, 0.0);
    }
}
