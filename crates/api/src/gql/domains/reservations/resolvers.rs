use async_graphql::{Context, Object, Result};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::auth::{require, Action};
use crate::gql::common::{PageInfo, PaginationInput};
use crate::gql::error::{DomainResultExt, IntoGqlError};
use crate::state::AppState;

use super::types::{
    CancellationOutcome, GameReservation, GameReservationPage, ReservationFilter, SortDirection,
    TimeSlot,
};

#[derive(Default)]
pub struct ReservationQuery;

#[Object]
impl ReservationQuery {
    /// Schedule slots of a game still free on a campus-local date, in schedule order.
    async fn available_slots(
        &self,
        ctx: &Context<'_>,
        game_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>> {
        require(ctx, Action::ViewGames)?;
        let state = ctx.data::<AppState>()?;

        let slots = state
            .reservations()
            .available_slots(game_id, date)
            .await
            .into_gql()?;
        Ok(slots.into_iter().map(TimeSlot::from).collect())
    }

    /// The caller's reservations, newest first.
    async fn my_game_reservations(&self, ctx: &Context<'_>) -> Result<Vec<GameReservation>> {
        let caller = require(ctx, Action::BookReservation)?;
        let state = ctx.data::<AppState>()?;
        let service = state.reservations();

        let now = Utc::now();
        let rows = service.list_for_user(caller.user_id).await.into_gql()?;
        Ok(rows
            .into_iter()
            .map(|row| GameReservation::from_row(row, now, service.offset()))
            .collect())
    }

    async fn all_game_reservations(
        &self,
        ctx: &Context<'_>,
        filter: Option<ReservationFilter>,
        sort: Option<SortDirection>,
        pagination: Option<PaginationInput>,
    ) -> Result<GameReservationPage> {
        require(ctx, Action::ViewAllReservations)?;
        let state = ctx.data::<AppState>()?;
        let service = state.reservations();

        let page = pagination.unwrap_or_default().to_limit_offset();
        let now = Utc::now();
        let (rows, total) = service
            .list_all(
                filter.unwrap_or_default().into(),
                sort.unwrap_or_default().into(),
                page,
                now,
            )
            .await
            .into_gql()?;

        let items: Vec<_> = rows
            .into_iter()
            .map(|row| GameReservation::from_row(row, now, service.offset()))
            .collect();
        Ok(GameReservationPage {
            page_info: PageInfo::new(items.len(), total, page),
            items,
        })
    }
}

#[derive(Default)]
pub struct ReservationMutation;

#[Object]
impl ReservationMutation {
    /// Book one schedule slot. `slot` is a start time (`"09:55"`) or a full
    /// label (`"09:55 - 10:05"`).
    async fn book_game_reservation(
        &self,
        ctx: &Context<'_>,
        game_id: Uuid,
        date: NaiveDate,
        slot: String,
    ) -> Result<GameReservation> {
        let caller = require(ctx, Action::BookReservation)?;
        let state = ctx.data::<AppState>()?;
        let service = state.reservations();

        let now = Utc::now();
        let row = service
            .book(caller.user_id, game_id, date, &slot, now)
            .await
            .into_gql()?;
        Ok(GameReservation::from_row(row, now, service.offset()))
    }

    async fn cancel_my_reservation(
        &self,
        ctx: &Context<'_>,
        reservation_id: Uuid,
    ) -> Result<GameReservation> {
        let caller = require(ctx, Action::CancelOwnReservation)?;
        let state = ctx.data::<AppState>()?;
        let service = state.reservations();

        let now = Utc::now();
        let row = service
            .cancel_own(caller.user_id, reservation_id, now)
            .await
            .into_gql()?;
        Ok(GameReservation::from_row(row, now, service.offset()))
    }

    async fn admin_cancel_reservation(
        &self,
        ctx: &Context<'_>,
        reservation_id: Uuid,
    ) -> Result<GameReservation> {
        require(ctx, Action::CancelAnyReservation)?;
        let state = ctx.data::<AppState>()?;
        let service = state.reservations();

        let row = service.cancel_by_admin(reservation_id).await.into_gql()?;
        Ok(GameReservation::from_row(row, Utc::now(), service.offset()))
    }

    /// Cancels each id independently; one failure does not stop the others.
    async fn admin_cancel_reservations(
        &self,
        ctx: &Context<'_>,
        reservation_ids: Vec<Uuid>,
    ) -> Result<Vec<CancellationOutcome>> {
        let caller = require(ctx, Action::CancelAnyReservation)?;
        let state = ctx.data::<AppState>()?;

        let outcomes = state
            .reservations()
            .cancel_many_by_admin(reservation_ids)
            .await;
        let failed = outcomes.iter().filter(|(_, r)| r.is_err()).count();
        tracing::info!(
            by = %caller.user_id,
            total = outcomes.len(),
            failed,
            "bulk reservation cancellation"
        );

        Ok(outcomes
            .into_iter()
            .map(|(id, result)| match result {
                Ok(_) => CancellationOutcome {
                    reservation_id: id.into(),
                    success: true,
                    error: None,
                    code: None,
                },
                Err(e) => CancellationOutcome {
                    reservation_id: id.into(),
                    success: false,
                    code: Some(e.code().as_str().to_string()),
                    error: Some(e.to_string()),
                },
            })
            .collect())
    }
}
