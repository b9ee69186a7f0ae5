use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::auth::{require, Action};
use crate::error::ErrorCode;
use crate::gql::error::{coded, DbResultExt};
use crate::state::AppState;

use super::types::Notification;

const DEFAULT_LIMIT: i32 = 50;

#[derive(Default)]
pub struct NotificationQuery;

#[Object]
impl NotificationQuery {
    /// The caller's notifications, newest first.
    async fn my_notifications(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
    ) -> Result<Vec<Notification>> {
        let caller = require(ctx, Action::ReadOwnNotifications)?;
        let state = ctx.data::<AppState>()?;

        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 200);
        let rows = state
            .notifications()
            .list_for_user(caller.user_id, i64::from(limit))
            .await
            .db_err()?;
        Ok(rows.into_iter().map(Notification::from).collect())
    }
}

#[derive(Default)]
pub struct NotificationMutation;

#[Object]
impl NotificationMutation {
    async fn mark_notification_read(&self, ctx: &Context<'_>, id: Uuid) -> Result<Notification> {
        let caller = require(ctx, Action::ReadOwnNotifications)?;
        let state = ctx.data::<AppState>()?;

        state
            .notifications()
            .mark_read(id, caller.user_id)
            .await
            .db_err()?
            .map(Notification::from)
            .ok_or_else(|| coded(ErrorCode::NotFound, "Bildirim bulunamadı."))
    }
}
