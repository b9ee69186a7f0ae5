use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::models::NotificationRow;

#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateNotification,
) -> Result<NotificationRow> {
    sqlx::query_as::<_, NotificationRow>(
        r#"
        INSERT INTO notifications (user_id, kind, title, message)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, kind, title, message, is_read, created_at
        "#,
    )
    .bind(data.user_id)
    .bind(data.kind)
    .bind(data.title)
    .bind(data.message)
    .fetch_one(executor)
    .await
}

pub async fn list_for_user<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<NotificationRow>> {
    sqlx::query_as::<_, NotificationRow>(
        r#"
        SELECT id, user_id, kind, title, message, is_read, created_at
        FROM notifications
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(executor)
    .await
}

/// Marks one of the user's notifications as read.
pub async fn mark_read<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<NotificationRow>> {
    sqlx::query_as::<_, NotificationRow>(
        r#"
        UPDATE notifications
        SET is_read = TRUE
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, kind, title, message, is_read, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}
