use async_trait::async_trait;
use chrono::{DateTime, Utc};
use infra::models::{GameReservationRow, GameRow, NotificationRow};
use infra::pagination::LimitOffset;
use infra::repos::{
    self, CreateGameData, CreateGameReservation, CreateNotification, ReservationBucket,
    ReservationStatus, SortOrder, UpdateGameData,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::{BookingOutcome, GameStore, NotificationStore, ReservationStore, StoreResult};
use crate::services::reservations::eligibility;

/// Serialization failures are retried this many times before giving up.
const MAX_BOOKING_RETRIES: usize = 3;

pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn try_book(
        &self,
        data: CreateGameReservation,
        now: DateTime<Utc>,
    ) -> StoreResult<BookingOutcome> {
        let mut tx = self.db.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        let active = repos::game_reservations::list_active_for_user(&mut *tx, data.user_id, now).await?;
        let last =
            repos::game_reservations::last_for_user_and_game(&mut *tx, data.user_id, data.game_id)
                .await?;

        if let Err(denial) = eligibility::evaluate(&active, last.as_ref(), now) {
            tx.rollback().await?;
            return Ok(BookingOutcome::Denied(denial));
        }

        if repos::game_reservations::find_confirmed_at_slot(&mut *tx, data.game_id, data.start_time)
            .await?
            .is_some()
        {
            tx.rollback().await?;
            return Ok(BookingOutcome::SlotTaken);
        }

        let row = match repos::game_reservations::create(&mut *tx, data).await {
            Ok(row) => row,
            Err(e) if is_unique_violation(&e) => return Ok(BookingOutcome::SlotTaken),
            Err(e) => return Err(e),
        };
        tx.commit().await?;

        Ok(BookingOutcome::Booked(row))
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

fn is_serialization_failure(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "40001")
}

#[async_trait]
impl GameStore for PgStore {
    async fn list(&self) -> StoreResult<Vec<GameRow>> {
        repos::games::list(&self.db).await
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<GameRow>> {
        repos::games::get_by_id(&self.db, id).await
    }

    async fn create(&self, data: CreateGameData) -> StoreResult<GameRow> {
        repos::games::create(&self.db, data).await
    }

    async fn update(&self, id: Uuid, data: UpdateGameData) -> StoreResult<Option<GameRow>> {
        repos::games::update(&self.db, id, data).await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        repos::games::delete(&self.db, id).await
    }
}

#[async_trait]
impl ReservationStore for PgStore {
    async fn confirmed_for_game_between(
        &self,
        game_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<GameReservationRow>> {
        repos::game_reservations::list_confirmed_for_game_between(&self.db, game_id, from, to).await
    }

    async fn book(
        &self,
        data: CreateGameReservation,
        now: DateTime<Utc>,
    ) -> StoreResult<BookingOutcome> {
        let mut attempt = 0;
        loop {
            match self.try_book(data.clone(), now).await {
                Err(e) if is_serialization_failure(&e) && attempt < MAX_BOOKING_RETRIES => {
                    attempt += 1;
                    tracing::debug!(attempt, user_id = %data.user_id, "booking serialization conflict, retrying");
                }
                outcome => return outcome,
            }
        }
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<GameReservationRow>> {
        repos::game_reservations::get_by_id(&self.db, id).await
    }

    async fn transition_from_confirmed(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> StoreResult<Option<GameReservationRow>> {
        repos::game_reservations::transition_from_confirmed(&self.db, id, status).await
    }

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<GameReservationRow>> {
        repos::game_reservations::list_for_user(&self.db, user_id).await
    }

    async fn list_all(
        &self,
        bucket: ReservationBucket,
        order: SortOrder,
        now: DateTime<Utc>,
        page: LimitOffset,
    ) -> StoreResult<Vec<GameReservationRow>> {
        repos::game_reservations::list_all(&self.db, bucket, order, now, page).await
    }

    async fn count_all(&self, bucket: ReservationBucket, now: DateTime<Utc>) -> StoreResult<i64> {
        repos::game_reservations::count_all(&self.db, bucket, now).await
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn create(&self, data: CreateNotification) -> StoreResult<NotificationRow> {
        repos::notifications::create(&self.db, data).await
    }

    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<NotificationRow>> {
        repos::notifications::list_for_user(&self.db, user_id, limit).await
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> StoreResult<Option<NotificationRow>> {
        repos::notifications::mark_read(&self.db, id, user_id).await
    }
}
