//! Part Model (inventory)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-branch value map, keyed by branch id
pub type BranchMap<T> = BTreeMap<String, T>;

/// Default unit for parts created without one
pub const DEFAULT_UNIT: &str = "pcs";

/// Default low-stock threshold
pub const DEFAULT_MIN_STOCK: i64 = 2;

/// Largest single manual stock correction, either direction
pub const MAX_STOCK_DELTA: i64 = 1_000_000;

/// Inventory part
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Part {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub retail_price: f64,
    pub wholesale_price: Option<f64>,
    /// Purchase cost per branch
    #[cfg_attr(feature = "db", sqlx(json))]
    pub cost_price: BranchMap<f64>,
    /// Quantity on hand per branch
    #[cfg_attr(feature = "db", sqlx(json))]
    pub stock: BranchMap<i64>,
    pub min_stock: i64,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Part {
    /// Quantity on hand at a branch (0 when the branch has no entry)
    pub fn stock_at(&self, branch_id: &str) -> i64 {
        self.stock.get(branch_id).copied().unwrap_or(0)
    }

    /// Purchase cost at a branch (0 when the branch has no entry)
    pub fn cost_at(&self, branch_id: &str) -> f64 {
        self.cost_price.get(branch_id).copied().unwrap_or(0.0)
    }

    /// Quantity across every branch
    pub fn total_stock(&self) -> i64 {
        self.stock.values().sum()
    }

    pub fn is_low_stock(&self, branch_id: &str) -> bool {
        self.stock_at(branch_id) <= self.min_stock
    }
}

/// Create part payload
///
/// `cost_price` and `stock` may be omitted; they then default to a map with
/// a single zero entry for the creating branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartCreate {
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub retail_price: f64,
    pub wholesale_price: Option<f64>,
    pub cost_price: Option<BranchMap<f64>>,
    pub stock: Option<BranchMap<i64>>,
    pub min_stock: Option<i64>,
    pub description: Option<String>,
}

/// A part ready for insertion, all defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct NewPart {
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub retail_price: f64,
    pub wholesale_price: Option<f64>,
    pub cost_price: BranchMap<f64>,
    pub stock: BranchMap<i64>,
    pub min_stock: i64,
    pub description: Option<String>,
}

impl PartCreate {
    pub fn validate(&self) -> Result<(), String> {
        if self.sku.trim().is_empty() {
            return Err("sku is required".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if !self.retail_price.is_finite() || self.retail_price < 0.0 {
            return Err(format!(
                "retail_price must be a non-negative number, got {}",
                self.retail_price
            ));
        }
        if let Some(w) = self.wholesale_price
            && (!w.is_finite() || w < 0.0)
        {
            return Err(format!("wholesale_price must be non-negative, got {w}"));
        }
        if let Some(costs) = &self.cost_price
            && let Some((branch, c)) = costs.iter().find(|(_, c)| !c.is_finite() || **c < 0.0)
        {
            return Err(format!("cost_price for {branch} must be non-negative, got {c}"));
        }
        if let Some(stock) = &self.stock
            && let Some((branch, q)) = stock.iter().find(|(_, q)| **q < 0)
        {
            return Err(format!("stock for {branch} must be non-negative, got {q}"));
        }
        if self.min_stock.is_some_and(|m| m < 0) {
            return Err("min_stock must be non-negative".to_string());
        }
        Ok(())
    }

    /// Apply defaults for the creating branch
    pub fn into_new_part(self, branch_id: &str) -> NewPart {
        let cost_price = self
            .cost_price
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| BranchMap::from([(branch_id.to_string(), 0.0)]));
        let stock = self
            .stock
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| BranchMap::from([(branch_id.to_string(), 0)]));

        NewPart {
            sku: self.sku.trim().to_string(),
            name: self.name.trim().to_string(),
            category: self
                .category
                .as_deref()
                .and_then(crate::util::normalize_category),
            unit: self
                .unit
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            retail_price: self.retail_price,
            wholesale_price: self.wholesale_price,
            cost_price,
            stock,
            min_stock: self.min_stock.unwrap_or(DEFAULT_MIN_STOCK),
            description: self.description,
        }
    }
}

/// Update part payload
///
/// `cost_price` entries are merged into the existing map; stock is changed
/// only through [`StockAdjust`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartUpdate {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub retail_price: Option<f64>,
    pub wholesale_price: Option<f64>,
    pub cost_price: Option<BranchMap<f64>>,
    pub min_stock: Option<i64>,
    pub description: Option<String>,
}

/// Manual stock correction at one branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjust {
    pub delta: i64,
    pub reason: Option<String>,
}

impl StockAdjust {
    pub fn validate(&self) -> Result<(), String> {
        if self.delta == 0 {
            return Err("delta must not be zero".to_string());
        }
        if self.delta.unsigned_abs() > MAX_STOCK_DELTA.unsigned_abs() {
            return Err(format!(
                "delta must be within ±{MAX_STOCK_DELTA}, got {}",
                self.delta
            ));
        }
        Ok(())
    }
}

/// Remaining stock of a part after a sale, as reported by `sale_create_atomic`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLevel {
    pub part_id: i64,
    pub name: String,
    pub remaining: i64,
    pub min_stock: i64,
}

impl StockLevel {
    pub fn is_low(&self) -> bool {
        self.remaining <= self.min_stock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create() -> PartCreate {
        PartCreate {
            sku: " BR-001 ".to_string(),
            name: "Brake pad".to_string(),
            category: Some("  Brakes ".to_string()),
            unit: None,
            retail_price: 120_000.0,
            wholesale_price: None,
            cost_price: None,
            stock: None,
            min_stock: None,
            description: None,
        }
    }

    #[test]
    fn defaults_cost_and_stock_to_creating_branch() {
        let part = create().into_new_part("CN2");
        assert_eq!(part.sku, "BR-001");
        assert_eq!(part.category.as_deref(), Some("Brakes"));
        assert_eq!(part.unit, DEFAULT_UNIT);
        assert_eq!(part.cost_price, BranchMap::from([("CN2".to_string(), 0.0)]));
        assert_eq!(part.stock, BranchMap::from([("CN2".to_string(), 0)]));
        assert_eq!(part.min_stock, DEFAULT_MIN_STOCK);
    }

    #[test]
    fn keeps_explicit_maps() {
        let mut input = create();
        input.cost_price = Some(BranchMap::from([("CN1".to_string(), 80_000.0)]));
        input.stock = Some(BranchMap::from([("CN1".to_string(), 12)]));
        let part = input.into_new_part("CN2");
        assert_eq!(part.cost_price.get("CN1"), Some(&80_000.0));
        assert!(!part.cost_price.contains_key("CN2"));
        assert_eq!(part.stock.get("CN1"), Some(&12));
    }

    #[test]
    fn rejects_bad_prices() {
        let mut input = create();
        input.retail_price = -1.0;
        assert!(input.validate().is_err());

        let mut input = create();
        input.stock = Some(BranchMap::from([("CN1".to_string(), -3)]));
        assert!(input.validate().is_err());

        let mut input = create();
        input.sku = "  ".to_string();
        assert!(input.validate().is_err());

        assert!(create().validate().is_ok());
    }

    #[test]
    fn branch_lookups() {
        let new = create().into_new_part("CN1");
        let part = Part {
            id: 1,
            sku: new.sku,
            name: new.name,
            category: new.category,
            unit: new.unit,
            retail_price: new.retail_price,
            wholesale_price: None,
            cost_price: BranchMap::from([("CN1".to_string(), 50.0)]),
            stock: BranchMap::from([("CN1".to_string(), 5), ("CN2".to_string(), 1)]),
            min_stock: 2,
            description: None,
            created_at: 0,
            updated_at: 0,
        };
        assert_eq!(part.stock_at("CN1"), 5);
        assert_eq!(part.stock_at("CN9"), 0);
        assert_eq!(part.cost_at("CN2"), 0.0);
        assert_eq!(part.total_stock(), 6);
        assert!(!part.is_low_stock("CN1"));
        assert!(part.is_low_stock("CN2"));
    }

    #[test]
    fn stock_adjust_bounds() {
        let adjust = |delta| StockAdjust { delta, reason: None };
        assert!(adjust(-3).validate().is_ok());
        assert!(adjust(MAX_STOCK_DELTA).validate().is_ok());
        assert!(adjust(0).validate().is_err());
        assert!(adjust(MAX_STOCK_DELTA + 1).validate().is_err());
        assert!(adjust(i64::MAX).validate().is_err());
        assert!(adjust(i64::MIN).validate().is_err());
    }
}
