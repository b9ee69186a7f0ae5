use crate::repos::game_reservations::ReservationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CampusRow {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
    pub campus_id: Option<Uuid>,
    pub student_class: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BookRow {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub category: String,
    pub campus_id: Option<Uuid>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BorrowedBookRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub campus_id: Option<Uuid>,
    pub category: Option<String>,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub fine_amount: Option<f64>,
    pub fine_status: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: Uuid,
    pub campus_id: Option<Uuid>,
    pub kind: String, // "income" | "expense"
    pub amount: f64,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct GameRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct GameReservationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game_id: Uuid,
    /// Copied from the game at booking time and never re-synced.
    pub game_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

impl GameReservationRow {
    /// Confirmed and not yet over.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Confirmed && self.end_time > now
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub id: String,
    pub entries: serde_json::Value, // JSONB field
    pub updated_at: DateTime<Utc>,
}
