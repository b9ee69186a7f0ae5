use async_graphql::{Context, Object, Result};

use crate::auth::{require, Action};
use crate::gql::error::DbResultExt;
use crate::services::leaderboard_service::load_monthly;
use crate::state::AppState;

use super::types::MonthlyLeaderboard;

#[derive(Default)]
pub struct LeaderboardQuery;

#[Object]
impl LeaderboardQuery {
    /// Most borrows this month, as of the last hourly refresh. `null` until
    /// the first refresh has run.
    async fn monthly_leaderboard(&self, ctx: &Context<'_>) -> Result<Option<MonthlyLeaderboard>> {
        require(ctx, Action::ViewLeaderboard)?;
        let state = ctx.data::<AppState>()?;

        Ok(load_monthly(&state.db).await.db_err()?.map(Into::into))
    }
}
