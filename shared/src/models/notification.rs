//! Notification Model

use serde::{Deserialize, Serialize};

super::text_enum! {
    pub enum NotificationKind: "notification kind" {
        LowStock => "low_stock",
        Sale => "sale",
        WorkOrder => "work_order",
        Cash => "cash",
        System => "system",
    }
}

/// In-app notification
///
/// `branch_id = None` is visible to every branch, `recipient_id = None`
/// to every user of the branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: i64,
    pub branch_id: Option<String>,
    pub recipient_id: Option<i64>,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: i64,
}

impl Notification {
    /// Whether `user_id` working in `branch_id` should see this notification
    pub fn is_visible_to(&self, user_id: i64, branch_id: &str) -> bool {
        let branch_ok = self.branch_id.as_deref().is_none_or(|b| b == branch_id);
        let recipient_ok = self.recipient_id.is_none_or(|r| r == user_id);
        branch_ok && recipient_ok
    }
}

/// Create notification payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationCreate {
    pub branch_id: Option<String>,
    pub recipient_id: Option<i64>,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl NotificationCreate {
    pub fn branch(
        branch_id: impl Into<String>,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            branch_id: Some(branch_id.into()),
            recipient_id: None,
            kind,
            title: title.into(),
            message: message.into(),
        }
    }
}
