//! In-memory push registry keyed by user id.
//!
//! Delivery is best effort and at most once: a notification for a user with no
//! live connection, or for no user at all, is dropped.

use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum Notification {
    /// A trap owned by `user` changed its caught status.
    TrapChange { user: u64 },
}

struct Subscriber {
    id: Uuid,
    tx: mpsc::UnboundedSender<String>,
}

pub struct Subscription {
    pub id: Uuid,
    pub rx: mpsc::UnboundedReceiver<String>,
}

#[derive(Default)]
pub struct NotificationHub {
    subscribers: RwLock<HashMap<u64, Vec<Subscriber>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, user_id: u64) -> Subscription {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        self.subscribers
            .write()
            .await
            .entry(user_id)
            .or_default()
            .push(Subscriber { id, tx });

        info!(connection_id = %id, user_id, "subscriber connected");
        Subscription { id, rx }
    }

    pub async fn unsubscribe(&self, user_id: u64, id: Uuid) {
        let mut subscribers = self.subscribers.write().await;
        if let Some(list) = subscribers.get_mut(&user_id) {
            list.retain(|s| s.id != id);
            if list.is_empty() {
                subscribers.remove(&user_id);
            }
            info!(connection_id = %id, user_id, "subscriber disconnected");
        }
    }

    /// Sends `notification` to every live connection of `recipient`.
    /// Returns how many connections accepted it.
    pub async fn publish(&self, recipient: Option<u64>, notification: Notification) -> usize {
        let Some(user_id) = recipient else {
            debug!(?notification, "notification without recipient dropped");
            return 0;
        };

        let json = match serde_json::to_string(&notification) {
            Ok(j) => j,
            Err(e) => {
                warn!(error = %e, "failed to serialize notification");
                return 0;
            }
        };

        let subscribers = self.subscribers.read().await;
        let Some(list) = subscribers.get(&user_id) else {
            debug!(user_id, "no live connection for notification");
            return 0;
        };

        let mut delivered = 0;
        for sub in list {
            match sub.tx.send(json.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => warn!(connection_id = %sub.id, error = %e, "failed to push notification"),
            }
        }
        delivered
    }

    pub async fn connection_count(&self) -> usize {
        self.subscribers.read().await.values().map(Vec::len).sum()
    }
}
