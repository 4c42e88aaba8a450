//! NotificationHub: live notification fan-out per branch
//!
//! ```text
//! services::notify (after the row is stored)
//!       │ Notification
//!       ▼
//! NotificationHub
//!   └── branches: branch_id → BranchLive
//!         ├── recent: last 100 notifications, keyed by id
//!         └── tx: broadcast::Sender<Notification> (fan-out to WS clients)
//!               │
//!               ▼
//!         api::notifications::ws (subscribe → filter by recipient → push)
//! ```
//!
//! Delivery is best effort: a lagging receiver skips what it missed.

use dashmap::DashMap;
use shared::models::Notification;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Broadcast channel capacity
const BROADCAST_CAPACITY: usize = 256;

/// Notifications kept per branch for newly connected clients
pub const RECENT_CAPACITY: usize = 100;

struct BranchLive {
    recent: Mutex<VecDeque<Notification>>,
    tx: broadcast::Sender<Notification>,
}

impl BranchLive {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            recent: Mutex::new(VecDeque::with_capacity(RECENT_CAPACITY)),
            tx,
        }
    }

    fn remember(&self, notification: &Notification) {
        let mut recent = self.recent.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = recent.iter_mut().find(|n| n.id == notification.id) {
            *existing = notification.clone();
            return;
        }
        if recent.len() >= RECENT_CAPACITY {
            recent.pop_front();
        }
        recent.push_back(notification.clone());
    }

    fn deliver(&self, notification: &Notification) {
        self.remember(notification);
        // No subscribers → send returns Err, safe to ignore
        let _ = self.tx.send(notification.clone());
    }
}

/// Global notification hub, isolated per branch
#[derive(Clone, Default)]
pub struct NotificationHub {
    branches: Arc<DashMap<String, BranchLive>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a stored notification.
    ///
    /// Branch-less notifications go to every branch the hub knows about.
    /// Returns the number of branches it was delivered to.
    pub fn publish(&self, notification: &Notification) -> usize {
        match notification.branch_id.as_deref() {
            Some(branch_id) => {
                self.get_or_create(branch_id).deliver(notification);
                1
            }
            None => {
                let mut delivered = 0;
                for branch in self.branches.iter() {
                    branch.deliver(notification);
                    delivered += 1;
                }
                delivered
            }
        }
    }

    /// Subscribe to a branch's live stream
    pub fn subscribe(&self, branch_id: &str) -> broadcast::Receiver<Notification> {
        self.get_or_create(branch_id).tx.subscribe()
    }

    /// Cached notifications of a branch, oldest first
    pub fn recent(&self, branch_id: &str) -> Vec<Notification> {
        self.branches
            .get(branch_id)
            .map(|b| {
                b.recent
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .iter()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reflect a read flag in the cache so reconnecting clients see it
    pub fn mark_read(&self, branch_id: &str, notification_id: Option<i64>) {
        if let Some(branch) = self.branches.get(branch_id) {
            let mut recent = branch.recent.lock().unwrap_or_else(|e| e.into_inner());
            for n in recent.iter_mut() {
                if notification_id.is_none_or(|id| id == n.id) {
                    n.is_read = true;
                }
            }
        }
    }

    fn get_or_create(&self, branch_id: &str) -> dashmap::mapref::one::Ref<'_, String, BranchLive> {
        self.branches
            .entry(branch_id.to_string())
            .or_insert_with(BranchLive::new)
            .downgrade()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::NotificationKind;

    fn make(id: i64, branch: Option<&str>) -> Notification {
        Notification {
            id,
            branch_id: branch.map(str::to_string),
            recipient_id: None,
            kind: NotificationKind::Sale,
            title: format!("Sale {id}"),
            message: String::new(),
            is_read: false,
            created_at: id,
        }
    }

    #[tokio::test]
    async fn subscribers_receive_their_branch_only() {
        let hub = NotificationHub::new();
        let mut cn1 = hub.subscribe("CN1");
        let mut cn2 = hub.subscribe("CN2");

        hub.publish(&make(1, Some("CN1")));

        assert_eq!(cn1.recv().await.unwrap().id, 1);
        assert!(matches!(
            cn2.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn branchless_fans_out() {
        let hub = NotificationHub::new();
        let mut cn1 = hub.subscribe("CN1");
        let mut cn2 = hub.subscribe("CN2");

        assert_eq!(hub.publish(&make(7, None)), 2);
        assert_eq!(cn1.recv().await.unwrap().id, 7);
        assert_eq!(cn2.recv().await.unwrap().id, 7);
        assert_eq!(hub.recent("CN2").len(), 1);
    }

    #[test]
    fn recent_is_bounded_and_keyed_by_id() {
        let hub = NotificationHub::new();
        for id in 0..(RECENT_CAPACITY as i64 + 5) {
            hub.publish(&make(id, Some("CN1")));
        }
        let recent = hub.recent("CN1");
        assert_eq!(recent.len(), RECENT_CAPACITY);
        assert_eq!(recent[0].id, 5);

        let mut again = make(50, Some("CN1"));
        again.title = "updated".to_string();
        hub.publish(&again);
        let recent = hub.recent("CN1");
        assert_eq!(recent.len(), RECENT_CAPACITY);
        assert_eq!(recent.iter().filter(|n| n.id == 50).count(), 1);
        assert!(recent.iter().any(|n| n.title == "updated"));

        assert!(hub.recent("CN9").is_empty());
    }

    #[test]
    fn mark_read_updates_cache() {
        let hub = NotificationHub::new();
        hub.publish(&make(1, Some("CN1")));
        hub.publish(&make(2, Some("CN1")));

        hub.mark_read("CN1", Some(1));
        let recent = hub.recent("CN1");
        assert!(recent[0].is_read);
        assert!(!recent[1].is_read);

        hub.mark_read("CN1", None);
        assert!(hub.recent("CN1").iter().all(|n| n.is_read));
    }
}
