use std::collections::HashMap;
use std::sync::Arc;

use infra::models::NotificationRow;
use infra::repos::CreateNotification;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::store::{NotificationStore, StoreResult};

const CHANNEL_CAPACITY: usize = 100;

pub const KIND_RESERVATION_CANCELLED: &str = "reservation_cancelled";
pub const KIND_ROLE_CHANGED: &str = "role_changed";

/// Per-user broadcast channels for live notification delivery.
#[derive(Clone, Default)]
pub struct NotificationHub {
    users: Arc<Mutex<HashMap<Uuid, broadcast::Sender<NotificationRow>>>>,
}

impl NotificationHub {
    /// Channels whose subscribers have all gone away are swept on every
    /// subscribe and publish.
    pub fn subscribe(&self, user_id: Uuid) -> broadcast::Receiver<NotificationRow> {
        let mut users = self.users.lock();
        users.retain(|_, sender| sender.receiver_count() > 0);
        users
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub fn publish(&self, notification: NotificationRow) {
        let mut users = self.users.lock();
        users.retain(|_, sender| sender.receiver_count() > 0);
        if let Some(sender) = users.get(&notification.user_id) {
            let _ = sender.send(notification);
        }
    }
}

/// Persists notifications and fans them out to live subscribers.
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    hub: NotificationHub,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>, hub: NotificationHub) -> Self {
        Self { store, hub }
    }

    pub fn hub(&self) -> &NotificationHub {
        &self.hub
    }

    pub async fn notify(
        &self,
        user_id: Uuid,
        kind: &str,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> StoreResult<NotificationRow> {
        let row = self
            .store
            .create(CreateNotification {
                user_id,
                kind: kind.to_string(),
                title: title.into(),
                message: message.into(),
            })
            .await?;
        self.hub.publish(row.clone());
        Ok(row)
    }

    pub async fn list_for_user(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<NotificationRow>> {
        self.store.list_for_user(user_id, limit).await
    }

    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> StoreResult<Option<NotificationRow>> {
        self.store.mark_read(id, user_id).await
    }
}
