//! Caller-scoped transactions
//!
//! Sets `app.user_id`, `app.branch_id` and `app.role` for the lifetime of a
//! transaction so `mc_current_branch()`, `mc_is_manager_or_owner()` and the
//! RLS policies see the caller.

use sqlx::{PgPool, Postgres, Transaction};

use super::BoxError;
use crate::auth::CurrentUser;

/// Who a scoped transaction acts for
#[derive(Debug, Clone)]
pub struct Actor<'a> {
    pub user: &'a CurrentUser,
    /// Resolved branch (see `auth::resolve_branch`)
    pub branch_id: &'a str,
}

/// Begin a transaction with the caller context applied
pub async fn begin_scoped(
    pool: &PgPool,
    actor: &Actor<'_>,
) -> Result<Transaction<'static, Postgres>, BoxError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        "SELECT set_config('app.user_id', $1, true),
                set_config('app.branch_id', $2, true),
                set_config('app.role', $3, true)",
    )
    .bind(actor.user.id.to_string())
    .bind(actor.branch_id)
    .bind(actor.user.role.as_str())
    .execute(&mut *tx)
    .await?;
    Ok(tx)
}
