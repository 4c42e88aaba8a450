//! Cash book endpoints
//!
//! Sale and deposit entries are written by their own flows; this module
//! covers manual income/expense entries and the period summary.

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use shared::ApiResponse;
use shared::error::{AppError, ErrorCode};
use shared::models::{CashSummary, CashTransaction, CashTransactionCreate};

use super::ApiResult;
use crate::auth::{BranchScope, require_manager_or_owner};
use crate::db::cash_transactions::CashQuery;
use crate::error::internal;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/cash", get(list).post(create))
        .route("/api/cash/summary", get(summary))
        .route("/api/cash/{id}", delete(remove))
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

/// Build a manual entry; a missing `occurred_at` means now
pub fn new_entry(
    data: CashTransactionCreate,
    id: i64,
    branch_id: &str,
    recorded_by: i64,
    now: i64,
) -> CashTransaction {
    CashTransaction {
        id,
        branch_id: branch_id.to_string(),
        kind: data.kind,
        category: data.category.trim().to_string(),
        amount: data.amount,
        payment_method: data.payment_method,
        reference: data.reference.filter(|r| !r.trim().is_empty()),
        description: data.description.filter(|d| !d.trim().is_empty()),
        recorded_by: Some(recorded_by),
        occurred_at: data.occurred_at.unwrap_or(now),
        created_at: now,
    }
}

/// GET /api/cash
pub async fn list(
    State(state): State<AppState>,
    scope: BranchScope,
    Query(query): Query<CashQuery>,
) -> ApiResult<Vec<CashTransaction>> {
    let rows = crate::db::cash_transactions::list(&state.pool, &scope.branch_id, &query)
        .await
        .map_err(internal)?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/cash
pub async fn create(
    State(state): State<AppState>,
    scope: BranchScope,
    Json(data): Json<CashTransactionCreate>,
) -> ApiResult<CashTransaction> {
    data.validate()?;
    let entry = new_entry(
        data,
        shared::util::snowflake_id(),
        &scope.branch_id,
        scope.user.id,
        shared::util::now_millis(),
    );
    let saved = crate::db::cash_transactions::create(&state.pool, &entry)
        .await
        .map_err(internal)?;
    tracing::info!(
        cash_id = saved.id,
        branch_id = %saved.branch_id,
        kind = %saved.kind,
        amount = saved.amount,
        "Cash entry recorded"
    );
    Ok(ApiResponse::success(saved))
}

/// DELETE /api/cash/{id} (manager or owner)
pub async fn remove(
    State(state): State<AppState>,
    scope: BranchScope,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    require_manager_or_owner(&scope.user)?;
    if !crate::db::cash_transactions::delete(&state.pool, id, &scope.branch_id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::CashTransactionNotFound).with_detail("cash_id", id));
    }
    tracing::info!(cash_id = id, user_id = scope.user.id, "Cash entry deleted");
    Ok(ApiResponse::success(()))
}

/// GET /api/cash/summary
pub async fn summary(
    State(state): State<AppState>,
    scope: BranchScope,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<CashSummary> {
    let summary = crate::db::cash_transactions::summary(
        &state.pool,
        &scope.branch_id,
        query.from,
        query.to,
    )
    .await
    .map_err(internal)?;
    Ok(ApiResponse::success(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{CashKind, PaymentMethod};

    fn input(occurred_at: Option<i64>) -> CashTransactionCreate {
        CashTransactionCreate {
            kind: CashKind::Expense,
            category: "  rent ".to_string(),
            amount: 1_500_000.0,
            payment_method: PaymentMethod::Bank,
            reference: Some("   ".to_string()),
            description: Some("March rent".to_string()),
            occurred_at,
        }
    }

    #[test]
    fn entry_defaults_to_now_and_trims() {
        let entry = new_entry(input(None), 9, "CN1", 4, 1_700_000_000_000);
        assert_eq!(entry.category, "rent");
        assert_eq!(entry.occurred_at, 1_700_000_000_000);
        assert_eq!(entry.reference, None);
        assert_eq!(entry.recorded_by, Some(4));
        assert_eq!(entry.branch_id, "CN1");
        assert_eq!(entry.signed_amount(), -1_500_000.0);
    }

    #[test]
    fn entry_keeps_backdated_time() {
        let entry = new_entry(input(Some(1_600_000_000_000)), 9, "CN1", 4, 1_700_000_000_000);
        assert_eq!(entry.occurred_at, 1_600_000_000_000);
        assert_eq!(entry.created_at, 1_700_000_000_000);
    }
}
