//! Sale creation and deletion

use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{NotificationCreate, NotificationKind, SaleCreate, SaleCreated, StockLevel};
use shared::money::{SaleTotals, money_eq, sale_totals};

use crate::auth::{BranchScope, require_manager_or_owner};
use crate::db::sales::SaleDeleted;
use crate::db::scope::Actor;
use crate::error::ServiceResult;
use crate::services::notify::notify_best_effort;
use crate::state::AppState;

/// Document code prefix for sales
pub const SALE_CODE_PREFIX: &str = "HD";

/// Ids and context a new sale is stamped with
#[derive(Debug, Clone, Copy)]
pub struct SaleContext<'a> {
    pub sale_id: i64,
    /// Id of the cash-book income row the procedure writes
    pub cash_id: i64,
    pub branch_id: &'a str,
    pub user_id: i64,
    pub now: i64,
}

/// A validated sale, ready for `sale_create_atomic`
#[derive(Debug, Clone)]
pub struct PreparedSale {
    pub code: String,
    pub totals: SaleTotals,
    pub payload: serde_json::Value,
}

/// Validate a sale request and build the procedure payload.
///
/// When the client sends the total it displayed, it must match the computed
/// total within 0.01.
pub fn prepare_sale(input: &SaleCreate, ctx: SaleContext<'_>) -> Result<PreparedSale, AppError> {
    let totals = sale_totals(
        &input.items,
        input.discount.unwrap_or(0.0),
        input.vat_rate_or_default(),
    )?;

    if let Some(client_total) = input.total
        && !money_eq(client_total, totals.total)
    {
        return Err(AppError::with_message(
            ErrorCode::SaleTotalMismatch,
            format!(
                "submitted total {client_total} does not match computed total {}",
                totals.total
            ),
        )
        .with_detail("submitted", client_total)
        .with_detail("computed", totals.total));
    }

    let code = shared::util::document_code(SALE_CODE_PREFIX, ctx.now, ctx.sale_id);
    let items: Vec<_> = input
        .items
        .iter()
        .map(|item| {
            json!({
                "part_id": item.part_id,
                "quantity": item.quantity,
                "unit_price": item.unit_price,
                "discount": item.discount.unwrap_or(0.0),
            })
        })
        .collect();
    let customer_name = input
        .customer_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let payload = json!({
        "id": ctx.sale_id,
        "cash_id": ctx.cash_id,
        "code": code,
        "branch_id": ctx.branch_id,
        "customer_id": input.customer_id,
        "customer_name": customer_name,
        "items": items,
        "subtotal": totals.subtotal,
        "discount": totals.discount,
        "vat_rate": totals.vat_rate,
        "vat_amount": totals.vat_amount,
        "total": totals.total,
        "payment_method": input.payment_method.unwrap_or_default().as_str(),
        "note": input.note,
        "created_by": ctx.user_id,
        "created_at": ctx.now,
    });

    Ok(PreparedSale {
        code,
        totals,
        payload,
    })
}

/// Low-stock notifications for the parts a sale left at or under their minimum
pub fn low_stock_notifications(stock: &[StockLevel], branch_id: &str) -> Vec<NotificationCreate> {
    stock
        .iter()
        .filter(|level| level.is_low())
        .map(|level| {
            NotificationCreate::branch(
                branch_id,
                NotificationKind::LowStock,
                "Low stock",
                format!(
                    "{}: {} left (minimum {})",
                    level.name, level.remaining, level.min_stock
                ),
            )
        })
        .collect()
}

/// Create a sale for the scoped branch, then notify the branch
pub async fn create_sale(
    state: &AppState,
    scope: &BranchScope,
    input: SaleCreate,
) -> ServiceResult<SaleCreated> {
    let ctx = SaleContext {
        sale_id: shared::util::snowflake_id(),
        cash_id: shared::util::snowflake_id(),
        branch_id: &scope.branch_id,
        user_id: scope.user.id,
        now: shared::util::now_millis(),
    };
    let prepared = prepare_sale(&input, ctx)?;

    let actor = Actor {
        user: &scope.user,
        branch_id: &scope.branch_id,
    };
    let created = crate::db::sales::create_atomic(&state.pool, &actor, &prepared.payload).await?;

    tracing::info!(
        sale_id = created.sale.id,
        code = %created.sale.code,
        branch_id = %scope.branch_id,
        user_id = scope.user.id,
        total = created.sale.total,
        "Sale created"
    );

    let mut notes = vec![NotificationCreate::branch(
        &scope.branch_id,
        NotificationKind::Sale,
        "New sale",
        format!(
            "{}: {} item(s), total {:.2}",
            created.sale.code,
            created.sale.item_count(),
            created.sale.total
        ),
    )];
    if state.low_stock_notify {
        notes.extend(low_stock_notifications(&created.stock, &scope.branch_id));
    }
    for note in notes {
        notify_best_effort(&state.pool, &state.hub, note).await;
    }

    Ok(created)
}

/// Delete a sale: restores stock and removes its cash entry (manager or owner)
pub async fn delete_sale(
    state: &AppState,
    scope: &BranchScope,
    sale_id: i64,
) -> ServiceResult<SaleDeleted> {
    require_manager_or_owner(&scope.user)?;
    let actor = Actor {
        user: &scope.user,
        branch_id: &scope.branch_id,
    };
    let deleted = crate::db::sales::delete(&state.pool, &actor, sale_id).await?;
    tracing::info!(
        sale_id,
        branch_id = %scope.branch_id,
        user_id = scope.user.id,
        restored = deleted.restored.len(),
        "Sale deleted"
    );
    Ok(deleted)
}
