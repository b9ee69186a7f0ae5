use async_graphql::{Enum, SimpleObject, ID};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use infra::models::GameReservationRow;
use infra::repos::{self, ReservationBucket, SortOrder};

use crate::gql::common::PageInfo;
use crate::services::reservations::cancellation::within_self_cancel_window;
use crate::services::reservations::schedule::{local_date, ClockTime, Slot};

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum ReservationStatus {
    Confirmed,
    CancelledByUser,
    CancelledByAdmin,
}

impl From<repos::ReservationStatus> for ReservationStatus {
    fn from(status: repos::ReservationStatus) -> Self {
        match status {
            repos::ReservationStatus::Confirmed => ReservationStatus::Confirmed,
            repos::ReservationStatus::CancelledByUser => ReservationStatus::CancelledByUser,
            repos::ReservationStatus::CancelledByAdmin => ReservationStatus::CancelledByAdmin,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum ReservationFilter {
    #[default]
    All,
    Active,
    Past,
    Cancelled,
}

impl From<ReservationFilter> for ReservationBucket {
    fn from(filter: ReservationFilter) -> Self {
        match filter {
            ReservationFilter::All => ReservationBucket::All,
            ReservationFilter::Active => ReservationBucket::Active,
            ReservationFilter::Past => ReservationBucket::Past,
            ReservationFilter::Cancelled => ReservationBucket::Cancelled,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl From<SortDirection> for SortOrder {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => SortOrder::Asc,
            SortDirection::Desc => SortOrder::Desc,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
    /// `"HH:MM - HH:MM"`
    pub label: String,
}

impl From<Slot> for TimeSlot {
    fn from(slot: Slot) -> Self {
        Self {
            start: slot.start.to_string(),
            end: slot.end.to_string(),
            label: slot.label(),
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct GameReservation {
    pub id: ID,
    pub user_id: ID,
    pub game_id: ID,
    pub game_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    /// Campus-local calendar date of the reservation.
    pub date: NaiveDate,
    /// Campus-local `"HH:MM - HH:MM"`.
    pub time_slot: String,
    /// Confirmed and not yet over.
    pub is_active: bool,
    /// The owner may still cancel it themselves.
    pub can_cancel: bool,
}

impl GameReservation {
    pub fn from_row(row: GameReservationRow, now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let time_slot = format!(
            "{} - {}",
            ClockTime::of(row.start_time, offset),
            ClockTime::of(row.end_time, offset)
        );
        Self {
            is_active: row.is_active(now),
            can_cancel: within_self_cancel_window(&row, now),
            date: local_date(row.start_time, offset),
            time_slot,
            id: row.id.into(),
            user_id: row.user_id.into(),
            game_id: row.game_id.into(),
            game_name: row.game_name,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status.into(),
            created_at: row.created_at,
        }
    }
}

/// Per-id outcome of a bulk administrative cancellation.
#[derive(SimpleObject, Clone, Debug)]
pub struct GameReservationPage {
    pub items: Vec<GameReservation>,
    #[graphql(flatten)]
    pub page_info: PageInfo,
}

#[derive(SimpleObject, Clone, Debug)]
pub struct CancellationOutcome {
    pub reservation_id: ID,
    pub success: bool,
    pub error: Option<String>,
    pub code: Option<String>,
}
