use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use infra::models::{GameReservationRow, GameRow, NotificationRow};
use infra::pagination::LimitOffset;
use infra::repos::{
    CreateGameData, CreateGameReservation, CreateNotification, ReservationBucket,
    ReservationStatus, SortOrder, UpdateGameData,
};
use parking_lot::Mutex;
use uuid::Uuid;

use super::{BookingOutcome, GameStore, NotificationStore, ReservationStore, StoreResult};
use crate::services::reservations::eligibility;

/// In-process store. A single mutex guards every table, so `book` is atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    games: Vec<GameRow>,
    reservations: Vec<GameReservationRow>,
    notifications: Vec<NotificationRow>,
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<GameRow>> {
        let mut games = self.inner.lock().games.clone();
        games.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(games)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<GameRow>> {
        Ok(self.inner.lock().games.iter().find(|g| g.id == id).cloned())
    }

    async fn create(&self, data: CreateGameData) -> StoreResult<GameRow> {
        let now = Utc::now();
        let row = GameRow {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            image_url: data.image_url,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().games.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, data: UpdateGameData) -> StoreResult<Option<GameRow>> {
        let mut tables = self.inner.lock();
        let Some(game) = tables.games.iter_mut().find(|g| g.id == id) else {
            return Ok(None);
        };
        if let Some(name) = data.name {
            game.name = name;
        }
        if let Some(description) = data.description {
            game.description = description;
        }
        if let Some(image_url) = data.image_url {
            game.image_url = Some(image_url);
        }
        game.updated_at = Utc::now();
        Ok(Some(game.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.inner.lock();
        let before = tables.games.len();
        tables.games.retain(|g| g.id != id);
        Ok(tables.games.len() < before)
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn confirmed_for_game_between(
        &self,
        game_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<GameReservationRow>> {
        let mut rows: Vec<_> = self
            .inner
            .lock()
            .reservations
            .iter()
            .filter(|r| {
                r.game_id == game_id
                    && r.status == ReservationStatus::Confirmed
                    && r.start_time >= from
                    && r.start_time <= to
            })
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.start_time);
        Ok(rows)
    }

    async fn book(
        &self,
        data: CreateGameReservation,
        now: DateTime<Utc>,
    ) -> StoreResult<BookingOutcome> {
        let mut tables = self.inner.lock();

        let active: Vec<_> = tables
            .reservations
            .iter()
            .filter(|r| r.user_id == data.user_id && r.is_active(now))
            .cloned()
            .collect();
        let last = tables
            .reservations
            .iter()
            .filter(|r| {
                r.user_id == data.user_id
                    && r.game_id == data.game_id
                    && r.status.counts_for_cooldown()
            })
            .max_by_key(|r| r.end_time)
            .cloned();

        if let Err(denial) = eligibility::evaluate(&active, last.as_ref(), now) {
            return Ok(BookingOutcome::Denied(denial));
        }

        let taken = tables.reservations.iter().any(|r| {
            r.game_id == data.game_id
                && r.start_time == data.start_time
                && r.status == ReservationStatus::Confirmed
        });
        if taken {
            return Ok(BookingOutcome::SlotTaken);
        }

        let row = GameReservationRow {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            game_id: data.game_id,
            game_name: data.game_name,
            start_time: data.start_time,
            end_time: data.end_time,
            status: ReservationStatus::Confirmed,
            created_at: data.created_at,
        };
        tables.reservations.push(row.clone());
        Ok(BookingOutcome::Booked(row))
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<GameReservationRow>> {
        Ok(self
            .inner
            .lock()
            .reservations
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn transition_from_confirmed(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> StoreResult<Option<GameReservationRow>> {
        let mut tables = self.inner.lock();
        let row = tables
            .reservations
            .iter_mut()
            .find(|r| r.id == id && r.status == ReservationStatus::Confirmed);
        Ok(row.map(|r| {
            r.status = status;
            r.clone()
        }))
    }

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<GameReservationRow>> {
        let mut rows: Vec<_> = self
            .inner
            .lock()
            .reservations
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| Reverse(r.start_time));
        Ok(rows)
    }

    async fn list_all(
        &self,
        bucket: ReservationBucket,
        order: SortOrder,
        now: DateTime<Utc>,
        page: LimitOffset,
    ) -> StoreResult<Vec<GameReservationRow>> {
        let mut rows: Vec<_> = self
            .inner
            .lock()
            .reservations
            .iter()
            .filter(|r| bucket.matches(r, now))
            .cloned()
            .collect();
        match order {
            SortOrder::Asc => rows.sort_by_key(|r| r.start_time),
            SortOrder::Desc => rows.sort_by_key(|r| Reverse(r.start_time)),
        }
        Ok(rows
            .into_iter()
            .skip(page.offset.max(0) as usize)
            .take(page.limit.max(0) as usize)
            .collect())
    }

    async fn count_all(&self, bucket: ReservationBucket, now: DateTime<Utc>) -> StoreResult<i64> {
        let count = self
            .inner
            .lock()
            .reservations
            .iter()
            .filter(|r| bucket.matches(r, now))
            .count();
        Ok(count as i64)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create(&self, data: CreateNotification) -> StoreResult<NotificationRow> {
        let row = NotificationRow {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            kind: data.kind,
            title: data.title,
            message: data.message,
            is_read: false,
            created_at: Utc::now(),
        };
        self.inner.lock().notifications.push(row.clone());
        Ok(row)
    }

    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<NotificationRow>> {
        let mut rows: Vec<_> = self
            .inner
            .lock()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|n| Reverse(n.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> StoreResult<Option<NotificationRow>> {
        let mut tables = self.inner.lock();
        let row = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id);
        Ok(row.map(|n| {
            n.is_read = true;
            n.clone()
        }))
    }
}
