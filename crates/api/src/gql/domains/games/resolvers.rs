use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::auth::{require, Action};
use crate::error::ErrorCode;
use crate::gql::error::{coded, DbResultExt};
use crate::state::AppState;

use super::types::{CreateGameInput, Game, UpdateGameInput};

const GAME_NOT_FOUND: &str = "Oyun bulunamadı.";
const NAME_REQUIRED: &str = "Oyun adı boş olamaz.";

#[derive(Default)]
pub struct GameQuery;

#[Object]
impl GameQuery {
    async fn games(&self, ctx: &Context<'_>) -> Result<Vec<Game>> {
        require(ctx, Action::ViewGames)?;
        let state = ctx.data::<AppState>()?;

        let rows = state.games().list().await.db_err()?;
        Ok(rows.into_iter().map(Game::from).collect())
    }

    async fn game(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Game>> {
        require(ctx, Action::ViewGames)?;
        let state = ctx.data::<AppState>()?;

        Ok(state.games().get(id).await.db_err()?.map(Game::from))
    }
}

#[derive(Default)]
pub struct GameMutation;

#[Object]
impl GameMutation {
    async fn create_game(&self, ctx: &Context<'_>, input: CreateGameInput) -> Result<Game> {
        let caller = require(ctx, Action::ManageGames)?;
        let state = ctx.data::<AppState>()?;

        let data = input
            .into_data()
            .ok_or_else(|| coded(ErrorCode::InvalidArgument, NAME_REQUIRED))?;
        let row = state.games().create(data).await.db_err()?;
        tracing::info!(game_id = %row.id, by = %caller.user_id, "game created");
        Ok(row.into())
    }

    async fn update_game(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateGameInput,
    ) -> Result<Game> {
        require(ctx, Action::ManageGames)?;
        let state = ctx.data::<AppState>()?;

        let data = input
            .into_data()
            .ok_or_else(|| coded(ErrorCode::InvalidArgument, NAME_REQUIRED))?;
        state
            .games()
            .update(id, data)
            .await
            .db_err()?
            .map(Game::from)
            .ok_or_else(|| coded(ErrorCode::NotFound, GAME_NOT_FOUND))
    }

    async fn delete_game(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        let caller = require(ctx, Action::ManageGames)?;
        let state = ctx.data::<AppState>()?;

        if !state.games().delete(id).await.db_err()? {
            return Err(coded(ErrorCode::NotFound, GAME_NOT_FOUND));
        }
        tracing::info!(game_id = %id, by = %caller.user_id, "game deleted");
        Ok(true)
    }
}
