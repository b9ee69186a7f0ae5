use async_graphql::{Context, Result, Subscription};
use futures_util::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;

use crate::auth::{require, Action};
use crate::gql::domains::notifications::types::Notification;
use crate::state::AppState;

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Live notifications for the authenticated user. Lagged messages are
    /// skipped; `myNotifications` has the full history.
    async fn user_notifications(
        &self,
        ctx: &Context<'_>,
    ) -> Result<impl Stream<Item = Notification>> {
        let caller = require(ctx, Action::ReadOwnNotifications)?;
        let state = ctx.data::<AppState>()?;

        let receiver = state.notifications().hub().subscribe(caller.user_id);
        Ok(BroadcastStream::new(receiver)
            .filter_map(|item| async move { item.ok().map(Notification::from) }))
    }
}
