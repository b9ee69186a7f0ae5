//! Storage seams for the reservation domain.
//!
//! Services talk to these traits rather than to `infra::repos` directly so the
//! same policy code runs against PostgreSQL in production and against the
//! in-process store in tests.

mod memory;
mod pg;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use infra::models::{GameReservationRow, GameRow, NotificationRow};
use infra::pagination::LimitOffset;
use infra::repos::{
    CreateGameData, CreateGameReservation, CreateNotification, ReservationBucket,
    ReservationStatus, SortOrder, UpdateGameData,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::services::reservations::eligibility::Denial;

pub use memory::MemoryStore;
pub use pg::PgStore;

pub type StoreResult<T> = Result<T, sqlx::Error>;

/// Result of the atomic check-then-insert.
#[derive(Debug)]
pub enum BookingOutcome {
    Booked(GameReservationRow),
    Denied(Denial),
    /// Another confirmed reservation already holds this game and start time.
    SlotTaken,
}

#[async_trait]
pub trait GameStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<GameRow>>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<GameRow>>;
    async fn create(&self, data: CreateGameData) -> StoreResult<GameRow>;
    async fn update(&self, id: Uuid, data: UpdateGameData) -> StoreResult<Option<GameRow>>;
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Confirmed reservations of a game starting inside `[from, to]`.
    async fn confirmed_for_game_between(
        &self,
        game_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<GameReservationRow>>;

    /// Runs the eligibility rules and the slot check, and inserts the
    /// reservation, as one atomic unit.
    async fn book(
        &self,
        data: CreateGameReservation,
        now: DateTime<Utc>,
    ) -> StoreResult<BookingOutcome>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<GameReservationRow>>;

    /// `None` when the row is missing or no longer confirmed.
    async fn transition_from_confirmed(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> StoreResult<Option<GameReservationRow>>;

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<GameReservationRow>>;

    async fn list_all(
        &self,
        bucket: ReservationBucket,
        order: SortOrder,
        now: DateTime<Utc>,
        page: LimitOffset,
    ) -> StoreResult<Vec<GameReservationRow>>;

    async fn count_all(&self, bucket: ReservationBucket, now: DateTime<Utc>) -> StoreResult<i64>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, data: CreateNotification) -> StoreResult<NotificationRow>;
    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<NotificationRow>>;
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> StoreResult<Option<NotificationRow>>;
}

#[derive(Clone)]
pub struct Stores {
    pub games: Arc<dyn GameStore>,
    pub reservations: Arc<dyn ReservationStore>,
    pub notifications: Arc<dyn NotificationStore>,
}

impl Stores {
    pub fn postgres(db: PgPool) -> Self {
        let store = Arc::new(PgStore::new(db));
        Self {
            games: store.clone(),
            reservations: store.clone(),
            notifications: store,
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::default());
        Self {
            games: store.clone(),
            reservations: store.clone(),
            notifications: store,
        }
    }
}
