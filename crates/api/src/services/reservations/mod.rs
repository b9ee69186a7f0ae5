//! Game reservation policy: availability, booking, cancellation and listings.

pub mod availability;
pub mod cancellation;
pub mod eligibility;
pub mod schedule;

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use futures_util::future::join_all;
use infra::models::GameReservationRow;
use infra::pagination::LimitOffset;
use infra::repos::{CreateGameReservation, ReservationBucket, ReservationStatus, SortOrder};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::gql::error::IntoGqlError;
use crate::services::notification_service::{NotificationService, KIND_RESERVATION_CANCELLED};
use crate::store::{BookingOutcome, GameStore, ReservationStore};

use eligibility::Denial;
use schedule::{local_date, Slot};

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("Zaten aktif bir oyun randevunuz bulunmaktadır.")]
    ActiveReservation,

    #[error(
        "Bu oyun için son 24 saat içinde zaten bir randevu almışsınız. \
         Yeni randevuyu {} tarihinden itibaren alabilirsiniz.",
        .resumes_at.format("%d.%m.%Y %H:%M")
    )]
    Cooldown { resumes_at: DateTime<FixedOffset> },

    #[error("Oyun bulunamadı.")]
    GameNotFound,

    #[error("Randevu bulunamadı.")]
    NotFound,

    #[error("Geçersiz zaman dilimi: {0}")]
    InvalidSlot(String),

    #[error("Geçmiş bir tarih için randevu alamazsınız.")]
    PastDate,

    #[error("Bu zaman dilimi artık müsait değil.")]
    SlotTaken,

    #[error("Randevular yalnızca oluşturulduktan sonraki 1 saat içinde iptal edilebilir.")]
    CancellationWindowClosed,

    #[error("Bu randevuyu iptal etme yetkiniz yok.")]
    NotOwner,

    #[error("Yalnızca onaylanmış randevular iptal edilebilir.")]
    NotConfirmed,

    #[error("İşlem sırasında bir hata oluştu. Lütfen tekrar deneyin.")]
    Db(sqlx::Error),
}

impl From<sqlx::Error> for ReservationError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("Database error: {e}");
        ReservationError::Db(e)
    }
}

impl IntoGqlError for ReservationError {
    fn code(&self) -> ErrorCode {
        match self {
            ReservationError::ActiveReservation
            | ReservationError::Cooldown { .. }
            | ReservationError::SlotTaken
            | ReservationError::CancellationWindowClosed
            | ReservationError::NotConfirmed => ErrorCode::FailedPrecondition,
            ReservationError::GameNotFound | ReservationError::NotFound => ErrorCode::NotFound,
            ReservationError::InvalidSlot(_) | ReservationError::PastDate => {
                ErrorCode::InvalidArgument
            }
            ReservationError::NotOwner => ErrorCode::PermissionDenied,
            ReservationError::Db(_) => ErrorCode::Internal,
        }
    }
}

pub type ReservationResult<T> = Result<T, ReservationError>;

#[derive(Clone)]
pub struct ReservationService {
    games: Arc<dyn GameStore>,
    reservations: Arc<dyn ReservationStore>,
    notifications: NotificationService,
    offset: FixedOffset,
}

impl ReservationService {
    pub fn new(
        games: Arc<dyn GameStore>,
        reservations: Arc<dyn ReservationStore>,
        notifications: NotificationService,
        offset: FixedOffset,
    ) -> Self {
        Self {
            games,
            reservations,
            notifications,
            offset,
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Free schedule slots of a game on a local calendar date.
    pub async fn available_slots(&self, game_id: Uuid, date: NaiveDate) -> ReservationResult<Vec<Slot>> {
        self.games
            .get(game_id)
            .await?
            .ok_or(ReservationError::GameNotFound)?;

        let (from, to) = schedule::day_bounds(date, self.offset)
            .ok_or_else(|| ReservationError::InvalidSlot(date.to_string()))?;
        let reserved = self
            .reservations
            .confirmed_for_game_between(game_id, from, to)
            .await?;

        Ok(availability::free_slots(&reserved, self.offset))
    }

    pub async fn book(
        &self,
        user_id: Uuid,
        game_id: Uuid,
        date: NaiveDate,
        slot: &str,
        now: DateTime<Utc>,
    ) -> ReservationResult<GameReservationRow> {
        let slot = Slot::parse(slot).ok_or_else(|| ReservationError::InvalidSlot(slot.to_string()))?;
        if date < local_date(now, self.offset) {
            return Err(ReservationError::PastDate);
        }

        let game = self
            .games
            .get(game_id)
            .await?
            .ok_or(ReservationError::GameNotFound)?;
        let (start_time, end_time) = slot
            .on(date, self.offset)
            .ok_or_else(|| ReservationError::InvalidSlot(slot.label()))?;

        let outcome = self
            .reservations
            .book(
                CreateGameReservation {
                    user_id,
                    game_id,
                    game_name: game.name,
                    start_time,
                    end_time,
                    created_at: now,
                },
                now,
            )
            .await?;

        match outcome {
            BookingOutcome::Booked(row) => {
                info!(reservation_id = %row.id, %user_id, %game_id, slot = %slot.label(), "game reserved");
                Ok(row)
            }
            BookingOutcome::Denied(Denial::ActiveReservation) => {
                Err(ReservationError::ActiveReservation)
            }
            BookingOutcome::Denied(Denial::Cooldown { resumes_at }) => {
                Err(ReservationError::Cooldown {
                    resumes_at: resumes_at.with_timezone(&self.offset),
                })
            }
            BookingOutcome::SlotTaken => Err(ReservationError::SlotTaken),
        }
    }

    /// Owner cancellation within the self-service window.
    pub async fn cancel_own(
        &self,
        user_id: Uuid,
        reservation_id: Uuid,
        now: DateTime<Utc>,
    ) -> ReservationResult<GameReservationRow> {
        let row = self
            .reservations
            .get(reservation_id)
            .await?
            .ok_or(ReservationError::NotFound)?;
        cancellation::check_self_cancel(&row, user_id, now)?;

        let row = self
            .reservations
            .transition_from_confirmed(reservation_id, ReservationStatus::CancelledByUser)
            .await?
            .ok_or(ReservationError::NotConfirmed)?;
        info!(%reservation_id, %user_id, "reservation cancelled by owner");
        Ok(row)
    }

    /// Administrative cancellation. The owner is notified; a failed
    /// notification does not undo the cancellation.
    pub async fn cancel_by_admin(&self, reservation_id: Uuid) -> ReservationResult<GameReservationRow> {
        self.reservations
            .get(reservation_id)
            .await?
            .ok_or(ReservationError::NotFound)?;

        let row = self
            .reservations
            .transition_from_confirmed(reservation_id, ReservationStatus::CancelledByAdmin)
            .await?
            .ok_or(ReservationError::NotConfirmed)?;
        info!(%reservation_id, user_id = %row.user_id, "reservation cancelled by admin");

        let message = format!(
            "{} oyunu için {} tarihli randevunuz yönetici tarafından iptal edildi.",
            row.game_name,
            row.start_time.with_timezone(&self.offset).format("%d.%m.%Y %H:%M")
        );
        if let Err(e) = self
            .notifications
            .notify(row.user_id, KIND_RESERVATION_CANCELLED, "Randevu iptal edildi", message)
            .await
        {
            warn!(%reservation_id, "failed to notify reservation owner: {e}");
        }

        Ok(row)
    }

    /// Independent per-id cancellations issued concurrently. Not atomic.
    pub async fn cancel_many_by_admin(
        &self,
        reservation_ids: Vec<Uuid>,
    ) -> Vec<(Uuid, ReservationResult<GameReservationRow>)> {
        join_all(
            reservation_ids
                .into_iter()
                .map(|id| async move { (id, self.cancel_by_admin(id).await) }),
        )
        .await
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> ReservationResult<Vec<GameReservationRow>> {
        Ok(self.reservations.list_for_user(user_id).await?)
    }

    pub async fn list_all(
        &self,
        bucket: ReservationBucket,
        order: SortOrder,
        page: LimitOffset,
        now: DateTime<Utc>,
    ) -> ReservationResult<(Vec<GameReservationRow>, i64)> {
        let (rows, total) = tokio::try_join!(
            self.reservations.list_all(bucket, order, now, page),
            self.reservations.count_all(bucket, now),
        )?;
        Ok((rows, total))
    }
}
