//! Cash Transaction Model (cash book)

use serde::{Deserialize, Serialize};

use super::PaymentMethod;

super::text_enum! {
    /// Direction of a cash book entry
    pub enum CashKind: "cash kind" {
        Income => "income",
        Expense => "expense",
    }
}

/// Reference prefixes written by the server
pub mod reference {
    /// Ledger entry of a completed sale
    pub const SALE: &str = "SALE-";
    /// Deposit recorded when a work order is created
    pub const DEPOSIT: &str = "DEP-";
    /// Deposit recorded by the one-off backfill
    pub const BACKFILL_DEPOSIT: &str = "BACKFILL-DEP-";

    pub fn sale(sale_id: i64) -> String {
        format!("{SALE}{sale_id}")
    }

    pub fn deposit(work_order_id: i64) -> String {
        format!("{DEPOSIT}{work_order_id}")
    }

    pub fn backfill_deposit(work_order_id: i64) -> String {
        format!("{BACKFILL_DEPOSIT}{work_order_id}")
    }

    /// Work order id carried by a `DEP-` or `BACKFILL-DEP-` reference
    pub fn deposit_work_order_id(reference: &str) -> Option<i64> {
        reference
            .strip_prefix(BACKFILL_DEPOSIT)
            .or_else(|| reference.strip_prefix(DEPOSIT))
            .and_then(|id| id.parse().ok())
    }
}

/// Category used for sale income
pub const CATEGORY_SALE: &str = "sale";
/// Category used for work order deposits
pub const CATEGORY_DEPOSIT: &str = "deposit";

/// Cash book entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CashTransaction {
    pub id: i64,
    pub branch_id: String,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub kind: CashKind,
    pub category: String,
    pub amount: f64,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub payment_method: PaymentMethod,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub recorded_by: Option<i64>,
    pub occurred_at: i64,
    pub created_at: i64,
}

impl CashTransaction {
    /// Amount with sign: income positive, expense negative
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            CashKind::Income => self.amount,
            CashKind::Expense => -self.amount,
        }
    }
}

/// Create cash transaction payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashTransactionCreate {
    pub kind: CashKind,
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub reference: Option<String>,
    pub description: Option<String>,
    /// Defaults to now
    pub occurred_at: Option<i64>,
}

impl CashTransactionCreate {
    pub fn validate(&self) -> Result<(), crate::error::AppError> {
        if self.category.trim().is_empty() {
            return Err(crate::error::AppError::with_message(
                crate::error::ErrorCode::RequiredField,
                "category is required",
            ));
        }
        crate::money::require_amount(self.amount, "amount")?;
        if self.amount == 0.0 {
            return Err(crate::error::AppError::with_message(
                crate::error::ErrorCode::InvalidAmount,
                "amount must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Income/expense totals for one payment method
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodTotals {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

/// Cash book summary over a period
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashSummary {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
    pub count: i64,
    pub by_method: std::collections::BTreeMap<String, MethodTotals>,
}

impl CashSummary {
    /// Fold transactions into a summary
    pub fn from_transactions<'a>(txs: impl IntoIterator<Item = &'a CashTransaction>) -> Self {
        use crate::money::{to_decimal, to_f64};
        use rust_decimal::Decimal;
        use std::collections::BTreeMap;

        let mut income = Decimal::ZERO;
        let mut expense = Decimal::ZERO;
        let mut count = 0;
        let mut methods: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();

        for tx in txs {
            count += 1;
            let amount = to_decimal(tx.amount);
            let entry = methods
                .entry(tx.payment_method.as_str().to_string())
                .or_default();
            match tx.kind {
                CashKind::Income => {
                    income += amount;
                    entry.0 += amount;
                }
                CashKind::Expense => {
                    expense += amount;
                    entry.1 += amount;
                }
            }
        }

        CashSummary {
            income: to_f64(income),
            expense: to_f64(expense),
            balance: to_f64(income - expense),
            count,
            by_method: methods
                .into_iter()
                .map(|(method, (i, e))| {
                    (
                        method,
                        MethodTotals {
                            income: to_f64(i),
                            expense: to_f64(e),
                            balance: to_f64(i - e),
                        },
                    )
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(kind: CashKind, amount: f64, method: PaymentMethod) -> CashTransaction {
        CashTransaction {
            id: 1,
            branch_id: "CN1".to_string(),
            kind,
            category: "sale".to_string(),
            amount,
            payment_method: method,
            reference: None,
            description: None,
            recorded_by: None,
            occurred_at: 0,
            created_at: 0,
        }
    }

    #[test]
    fn reference_parsing() {
        assert_eq!(reference::deposit(42), "DEP-42");
        assert_eq!(reference::backfill_deposit(42), "BACKFILL-DEP-42");
        assert_eq!(reference::deposit_work_order_id("DEP-42"), Some(42));
        assert_eq!(reference::deposit_work_order_id("BACKFILL-DEP-7"), Some(7));
        assert_eq!(reference::deposit_work_order_id("SALE-7"), None);
        assert_eq!(reference::deposit_work_order_id("DEP-x"), None);
    }

    #[test]
    fn summary_by_method() {
        let txs = vec![
            tx(CashKind::Income, 100.10, PaymentMethod::Cash),
            tx(CashKind::Income, 50.0, PaymentMethod::Bank),
            tx(CashKind::Expense, 20.05, PaymentMethod::Cash),
        ];
        let s = CashSummary::from_transactions(&txs);
        assert_eq!(s.count, 3);
        assert_eq!(s.income, 150.1);
        assert_eq!(s.expense, 20.05);
        assert_eq!(s.balance, 130.05);
        assert_eq!(s.by_method["cash"].balance, 80.05);
        assert_eq!(s.by_method["bank"].expense, 0.0);
        assert_eq!(txs[2].signed_amount(), -20.05);
    }

    #[test]
    fn payment_method_defaults_to_cash() {
        let create: CashTransactionCreate = serde_json::from_value(serde_json::json!({
            "kind": "expense", "category": "rent", "amount": 10.0
        }))
        .unwrap();
        assert_eq!(create.payment_method, PaymentMethod::Cash);
        assert!(create.validate().is_ok());

        let zero = CashTransactionCreate {
            amount: 0.0,
            ..create
        };
        assert!(zero.validate().is_err());
    }
}
