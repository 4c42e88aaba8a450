//! Work order (service ticket) operations

use shared::error::{AppError, ErrorCode};
use shared::models::{
    CATEGORY_DEPOSIT, CashKind, CashTransaction, NotificationCreate, NotificationKind,
    PaymentStatus, WorkOrder, WorkOrderCreate, WorkOrderStatus, WorkOrderUpdate, normalize_phone,
    normalize_plate, reference,
};
use shared::money::round_money;

use crate::auth::BranchScope;
use crate::error::ServiceResult;
use crate::services::notify::notify_best_effort;
use crate::state::AppState;

/// Document code prefix for work orders (service card)
pub const WORK_ORDER_CODE_PREFIX: &str = "SC";

/// Ids and context a new work order is stamped with
#[derive(Debug, Clone, Copy)]
pub struct WorkOrderContext<'a> {
    pub id: i64,
    /// Id of the deposit cash entry, used only when a deposit is taken
    pub cash_id: i64,
    pub branch_id: &'a str,
    pub user_id: i64,
    pub now: i64,
}

/// Build a new work order and its deposit cash entry (when deposit > 0)
pub fn build_work_order(
    input: WorkOrderCreate,
    ctx: WorkOrderContext<'_>,
) -> Result<(WorkOrder, Option<CashTransaction>), AppError> {
    input.validate()?;

    let code = shared::util::document_code(WORK_ORDER_CODE_PREFIX, ctx.now, ctx.id);
    let deposit_amount = round_money(input.deposit_amount.unwrap_or(0.0));
    let has_deposit = deposit_amount > 0.0;

    let mut order = WorkOrder {
        id: ctx.id,
        code,
        branch_id: ctx.branch_id.to_string(),
        customer_id: input.customer_id,
        customer_name: input.customer_name.trim().to_string(),
        customer_phone: input.customer_phone.as_deref().and_then(normalize_phone),
        vehicle_model: input.vehicle_model,
        license_plate: input.license_plate.as_deref().and_then(normalize_plate),
        issue_description: input.issue_description.trim().to_string(),
        technician_name: input.technician_name,
        status: WorkOrderStatus::Received,
        parts_used: input.parts_used,
        labor_cost: input.labor_cost.unwrap_or(0.0),
        discount: input.discount.unwrap_or(0.0),
        deposit_amount,
        deposit_paid_at: has_deposit.then_some(ctx.now),
        total: 0.0,
        paid_amount: 0.0,
        payment_status: PaymentStatus::Unpaid,
        note: input.note,
        created_by: ctx.user_id,
        created_at: ctx.now,
        updated_at: ctx.now,
    };
    order.recompute()?;

    let deposit = has_deposit.then(|| CashTransaction {
        id: ctx.cash_id,
        branch_id: order.branch_id.clone(),
        kind: CashKind::Income,
        category: CATEGORY_DEPOSIT.to_string(),
        amount: deposit_amount,
        payment_method: input.deposit_method.unwrap_or_default(),
        reference: Some(reference::deposit(order.id)),
        description: Some(format!("Deposit {}", order.code)),
        recorded_by: Some(ctx.user_id),
        occurred_at: ctx.now,
        created_at: ctx.now,
    });

    Ok((order, deposit))
}

/// Notification sent when a ticket becomes ready for pickup
pub fn completion_notification(order: &WorkOrder) -> NotificationCreate {
    NotificationCreate::branch(
        &order.branch_id,
        NotificationKind::WorkOrder,
        "Work order completed",
        format!(
            "{} ({}) is ready, balance due {:.2}",
            order.code,
            order.customer_name,
            order.balance_due()
        ),
    )
}

pub async fn create_work_order(
    state: &AppState,
    scope: &BranchScope,
    input: WorkOrderCreate,
) -> ServiceResult<WorkOrder> {
    let ctx = WorkOrderContext {
        id: shared::util::snowflake_id(),
        cash_id: shared::util::snowflake_id(),
        branch_id: &scope.branch_id,
        user_id: scope.user.id,
        now: shared::util::now_millis(),
    };
    let (order, deposit) = build_work_order(input, ctx)?;
    crate::db::work_orders::create(&state.pool, &order, deposit.as_ref()).await?;

    tracing::info!(
        work_order_id = order.id,
        code = %order.code,
        branch_id = %order.branch_id,
        deposit = order.deposit_amount,
        "Work order created"
    );
    Ok(order)
}

/// Apply an update, enforcing the lifecycle; notifies the branch on completion
pub async fn update_work_order(
    state: &AppState,
    scope: &BranchScope,
    id: i64,
    update: WorkOrderUpdate,
) -> ServiceResult<WorkOrder> {
    let mut order = crate::db::work_orders::get(&state.pool, id, &scope.branch_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::WorkOrderNotFound))?;

    let previous = order.apply_update(update)?;
    order.updated_at = shared::util::now_millis();

    let saved = crate::db::work_orders::save(&state.pool, &order)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::WorkOrderNotFound))?;

    if let Some(from) = previous {
        tracing::info!(
            work_order_id = saved.id,
            branch_id = %saved.branch_id,
            from = %from,
            to = %saved.status,
            "Work order status changed"
        );
        if saved.status == WorkOrderStatus::Completed {
            notify_best_effort(&state.pool, &state.hub, completion_notification(&saved)).await;
        }
    }
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{PaymentMethod, WorkOrderPart};

    fn ctx() -> WorkOrderContext<'static> {
        WorkOrderContext {
            id: 0xABCD,
            cash_id: 5,
            branch_id: "CN2",
            user_id: 3,
            now: 1_768_464_000_000,
        }
    }

    fn input(deposit: Option<f64>) -> WorkOrderCreate {
        WorkOrderCreate {
            customer_id: None,
            customer_name: " Lan ".to_string(),
            customer_phone: Some("0903 123 456".to_string()),
            vehicle_model: Some("Yamaha Exciter".to_string()),
            license_plate: Some("59-x1 234.56".to_string()),
            issue_description: "Oil leak".to_string(),
            technician_name: None,
            parts_used: vec![WorkOrderPart {
                part_id: None,
                name: "Gasket".to_string(),
                quantity: 2,
                unit_price: 40_000.0,
            }],
            labor_cost: Some(120_000.0),
            discount: None,
            deposit_amount: deposit,
            deposit_method: Some(PaymentMethod::Bank),
            note: None,
        }
    }

    #[test]
    fn builds_ticket_with_deposit_entry() {
        let (order, deposit) = build_work_order(input(Some(100_000.0)), ctx()).unwrap();
        assert_eq!(order.code, "SC-20260115-ABCD");
        assert_eq!(order.customer_name, "Lan");
        assert_eq!(order.customer_phone.as_deref(), Some("0903123456"));
        assert_eq!(order.license_plate.as_deref(), Some("59-X1234.56"));
        assert_eq!(order.status, WorkOrderStatus::Received);
        assert_eq!(order.total, 200_000.0);
        assert_eq!(order.payment_status, PaymentStatus::Partial);
        assert_eq!(order.deposit_paid_at, Some(ctx().now));

        let deposit = deposit.unwrap();
        assert_eq!(deposit.reference.as_deref(), Some("DEP-43981"));
        assert_eq!(deposit.category, CATEGORY_DEPOSIT);
        assert_eq!(deposit.kind, CashKind::Income);
        assert_eq!(deposit.payment_method, PaymentMethod::Bank);
        assert_eq!(deposit.amount, 100_000.0);
        assert_eq!(deposit.branch_id, "CN2");
    }

    #[test]
    fn no_deposit_no_cash_entry() {
        let (order, deposit) = build_work_order(input(None), ctx()).unwrap();
        assert!(deposit.is_none());
        assert_eq!(order.deposit_paid_at, None);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);

        let (_, deposit) = build_work_order(input(Some(0.0)), ctx()).unwrap();
        assert!(deposit.is_none());
    }

    #[test]
    fn rejects_missing_description_and_negative_deposit() {
        let mut bad = input(None);
        bad.issue_description = "  ".to_string();
        assert_eq!(
            build_work_order(bad, ctx()).unwrap_err().code,
            ErrorCode::RequiredField
        );
        assert_eq!(
            build_work_order(input(Some(-5.0)), ctx()).unwrap_err().code,
            ErrorCode::InvalidAmount
        );
    }

    #[test]
    fn completion_message_carries_balance() {
        let (mut order, _) = build_work_order(input(Some(50_000.0)), ctx()).unwrap();
        order.status = WorkOrderStatus::Completed;
        let note = completion_notification(&order);
        assert_eq!(note.kind, NotificationKind::WorkOrder);
        assert_eq!(note.message, "SC-20260115-ABCD (Lan) is ready, balance due 150000.00");
    }
}
