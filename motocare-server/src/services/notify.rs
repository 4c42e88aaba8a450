//! Store a notification, then push it to live subscribers

use shared::models::{Notification, NotificationCreate};
use sqlx::PgPool;

use crate::BoxError;
use crate::live::NotificationHub;

pub async fn notify(
    pool: &PgPool,
    hub: &NotificationHub,
    data: &NotificationCreate,
) -> Result<Notification, BoxError> {
    let now = shared::util::now_millis();
    let notification =
        crate::db::notifications::create(pool, shared::util::snowflake_id(), data, now).await?;
    let branches = hub.publish(&notification);
    tracing::debug!(
        notification_id = notification.id,
        kind = %notification.kind,
        branches,
        "Notification published"
    );
    Ok(notification)
}

/// Like [`notify`], but a failure is only logged.
///
/// Used after the main write has committed, where a lost notification must
/// not turn a successful request into an error.
pub async fn notify_best_effort(pool: &PgPool, hub: &NotificationHub, data: NotificationCreate) {
    if let Err(e) = notify(pool, hub, &data).await {
        tracing::warn!(
            kind = %data.kind,
            branch_id = data.branch_id.as_deref().unwrap_or("*"),
            error = %e,
            "Failed to store notification"
        );
    }
}
