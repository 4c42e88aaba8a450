//! Deposit backfill
//!
//! Work orders created before deposits produced cash-book entries carry a
//! `deposit_amount` with no matching income. The backfill writes one entry
//! per such work order, referenced `BACKFILL-DEP-<id>`; a work order that
//! already has a `DEP-<id>` or `BACKFILL-DEP-<id>` entry is skipped, so
//! running it again inserts nothing.

use serde::Serialize;
use shared::models::{
    CATEGORY_DEPOSIT, CashKind, CashTransaction, PaymentMethod, WorkOrder, reference,
};
use sqlx::PgPool;
use std::collections::HashSet;

use crate::BoxError;

/// LIKE patterns of the references that mark a deposit as recorded
pub const DEPOSIT_REFERENCE_PATTERNS: [&str; 2] = ["DEP-%", "BACKFILL-DEP-%"];

/// A deposit entry still to be written
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepositDraft {
    pub work_order_id: i64,
    pub work_order_code: String,
    pub branch_id: String,
    pub amount: f64,
    pub occurred_at: i64,
    pub recorded_by: i64,
}

impl DepositDraft {
    pub fn reference(&self) -> String {
        reference::backfill_deposit(self.work_order_id)
    }

    pub fn into_cash_transaction(self, id: i64, now: i64) -> CashTransaction {
        CashTransaction {
            id,
            reference: Some(self.reference()),
            branch_id: self.branch_id,
            kind: CashKind::Income,
            category: CATEGORY_DEPOSIT.to_string(),
            amount: self.amount,
            payment_method: PaymentMethod::Cash,
            description: Some(format!("Deposit {} (backfill)", self.work_order_code)),
            recorded_by: Some(self.recorded_by),
            occurred_at: self.occurred_at,
            created_at: now,
        }
    }
}

/// Outcome of a backfill run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BackfillReport {
    pub dry_run: bool,
    /// Work orders with a deposit
    pub scanned: usize,
    /// Of those, already carrying a deposit entry
    pub already_recorded: usize,
    /// Entries written (0 on a dry run)
    pub inserted: usize,
    pub drafts: Vec<DepositDraft>,
}

/// Drafts for every work order with a deposit and no recorded entry.
///
/// `existing_references` are cash-book references; anything that is not a
/// deposit reference is ignored.
pub fn plan_deposit_backfill(
    work_orders: &[WorkOrder],
    existing_references: &[String],
) -> Vec<DepositDraft> {
    let recorded: HashSet<i64> = existing_references
        .iter()
        .filter_map(|r| reference::deposit_work_order_id(r))
        .collect();

    work_orders
        .iter()
        .filter(|wo| wo.deposit_amount > 0.0 && !recorded.contains(&wo.id))
        .map(|wo| DepositDraft {
            work_order_id: wo.id,
            work_order_code: wo.code.clone(),
            branch_id: wo.branch_id.clone(),
            amount: shared::money::round_money(wo.deposit_amount),
            occurred_at: wo.deposit_paid_at.unwrap_or(wo.created_at),
            recorded_by: wo.created_by,
        })
        .collect()
}

/// Plan and (unless `dry_run`) write the missing deposit entries in one transaction
pub async fn run_deposit_backfill(pool: &PgPool, dry_run: bool) -> Result<BackfillReport, BoxError> {
    let work_orders = crate::db::work_orders::list_with_deposit(pool).await?;
    let references =
        crate::db::cash_transactions::list_references(pool, &DEPOSIT_REFERENCE_PATTERNS).await?;

    let drafts = plan_deposit_backfill(&work_orders, &references);
    let mut report = BackfillReport {
        dry_run,
        scanned: work_orders.len(),
        already_recorded: work_orders.len() - drafts.len(),
        inserted: 0,
        drafts,
    };
    tracing::info!(
        scanned = report.scanned,
        already_recorded = report.already_recorded,
        pending = report.drafts.len(),
        dry_run,
        "Deposit backfill planned"
    );

    if dry_run || report.drafts.is_empty() {
        return Ok(report);
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    for draft in &report.drafts {
        let cash = draft
            .clone()
            .into_cash_transaction(shared::util::snowflake_id(), now);
        crate::db::cash_transactions::insert(&mut *tx, &cash).await?;
        tracing::debug!(
            work_order_id = draft.work_order_id,
            reference = cash.reference.as_deref().unwrap_or_default(),
            amount = draft.amount,
            "Deposit entry written"
        );
    }
    tx.commit().await?;
    report.inserted = report.drafts.len();

    tracing::info!(inserted = report.inserted, "Deposit backfill complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{PaymentStatus, WorkOrderStatus};

    fn order(id: i64, deposit: f64) -> WorkOrder {
        WorkOrder {
            id,
            code: format!("SC-20250301-{id:04X}"),
            branch_id: "CN1".to_string(),
            customer_id: None,
            customer_name: "Khoa".to_string(),
            customer_phone: None,
            vehicle_model: None,
            license_plate: None,
            issue_description: "Brake check".to_string(),
            technician_name: None,
            status: WorkOrderStatus::InProgress,
            parts_used: vec![],
            labor_cost: 0.0,
            discount: 0.0,
            deposit_amount: deposit,
            deposit_paid_at: None,
            total: 0.0,
            paid_amount: 0.0,
            payment_status: PaymentStatus::Unpaid,
            note: None,
            created_by: 42,
            created_at: 1_740_787_200_000,
            updated_at: 1_740_787_200_000,
        }
    }

    #[test]
    fn skips_orders_with_existing_deposit_entries() {
        let orders = vec![order(1, 50_000.0), order(2, 80_000.0), order(3, 0.0), order(4, 20_000.0)];
        let refs = vec![
            "DEP-1".to_string(),
            "BACKFILL-DEP-4".to_string(),
            "SALE-2".to_string(),
        ];
        let drafts = plan_deposit_backfill(&orders, &refs);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].work_order_id, 2);
        assert_eq!(drafts[0].reference(), "BACKFILL-DEP-2");
        assert_eq!(drafts[0].occurred_at, 1_740_787_200_000);
        assert_eq!(drafts[0].recorded_by, 42);
    }

    #[test]
    fn planning_is_idempotent() {
        let orders = vec![order(7, 10_000.0), order(8, 15_000.0)];
        let first = plan_deposit_backfill(&orders, &[]);
        assert_eq!(first.len(), 2);

        let written: Vec<String> = first.iter().map(DepositDraft::reference).collect();
        assert!(plan_deposit_backfill(&orders, &written).is_empty());
    }

    #[test]
    fn draft_becomes_cash_income() {
        let mut wo = order(9, 30_000.0);
        wo.deposit_paid_at = Some(1_740_800_000_000);
        let draft = plan_deposit_backfill(&[wo], &[]).remove(0);
        let cash = draft.into_cash_transaction(100, 1_750_000_000_000);
        assert_eq!(cash.kind, CashKind::Income);
        assert_eq!(cash.category, CATEGORY_DEPOSIT);
        assert_eq!(cash.reference.as_deref(), Some("BACKFILL-DEP-9"));
        assert_eq!(cash.occurred_at, 1_740_800_000_000);
        assert_eq!(cash.created_at, 1_750_000_000_000);
        assert_eq!(cash.recorded_by, Some(42));
    }
}
