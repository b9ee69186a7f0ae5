use async_graphql::{SimpleObject, ID};
use chrono::{DateTime, Utc};
use infra::models::NotificationRow;

#[derive(SimpleObject, Clone, Debug)]
pub struct Notification {
    pub id: ID,
    pub user_id: ID,
    /// e.g. `reservation_cancelled`, `role_changed`
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id.into(),
            user_id: row.user_id.into(),
            kind: row.kind,
            title: row.title,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}
