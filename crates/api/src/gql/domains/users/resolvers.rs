use async_graphql::{Context, Object, Result};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{authenticated, require, Action, Role};
use crate::gql::error::DomainResultExt;
use crate::state::AppState;

use super::types::AdminActionResult;

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    /// Promote the user with `email` to admin. Limited per caller per rolling hour.
    async fn set_admin_role(&self, ctx: &Context<'_>, email: String) -> Result<AdminActionResult> {
        let caller = require(ctx, Action::AssignAdminRole)?;
        let state = ctx.data::<AppState>()?;

        let message = state
            .user_admin()
            .set_admin_role(&caller, &email, Utc::now())
            .await
            .into_gql()?;
        Ok(message.into())
    }

    async fn set_role(
        &self,
        ctx: &Context<'_>,
        user_id: Uuid,
        role: Role,
        campus_id: Option<Uuid>,
    ) -> Result<AdminActionResult> {
        let caller = require(ctx, Action::AssignAnyRole)?;
        let state = ctx.data::<AppState>()?;

        let message = state
            .user_admin()
            .set_role(&caller, user_id, role, campus_id)
            .await
            .into_gql()?;
        Ok(message.into())
    }

    /// Bootstrap: the caller becomes admin if nobody is one yet.
    async fn initialize_first_admin(&self, ctx: &Context<'_>) -> Result<AdminActionResult> {
        let caller = authenticated(ctx)?;
        let state = ctx.data::<AppState>()?;

        let message = state
            .user_admin()
            .initialize_first(&caller, Role::Admin)
            .await
            .into_gql()?;
        Ok(message.into())
    }

    async fn initialize_first_super_admin(&self, ctx: &Context<'_>) -> Result<AdminActionResult> {
        let caller = authenticated(ctx)?;
        let state = ctx.data::<AppState>()?;

        let message = state
            .user_admin()
            .initialize_first(&caller, Role::SuperAdmin)
            .await
            .into_gql()?;
        Ok(message.into())
    }

    async fn delete_user(&self, ctx: &Context<'_>, user_id: Uuid) -> Result<AdminActionResult> {
        let caller = require(ctx, Action::DeleteUser)?;
        let state = ctx.data::<AppState>()?;

        let message = state
            .user_admin()
            .delete_user(&caller, user_id)
            .await
            .into_gql()?;
        Ok(message.into())
    }
}
