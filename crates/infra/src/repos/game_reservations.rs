use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Postgres, QueryBuilder, Result};
use uuid::Uuid;

use crate::{models::GameReservationRow, pagination::LimitOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "reservation_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ReservationStatus {
    Confirmed,
    CancelledByUser,
    CancelledByAdmin,
}

impl ReservationStatus {
    pub fn is_cancelled(&self) -> bool {
        !matches!(self, ReservationStatus::Confirmed)
    }

    /// Statuses that start the per-game cooldown.
    pub fn counts_for_cooldown(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Confirmed | ReservationStatus::CancelledByUser
        )
    }
}

/// Admin listing buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReservationBucket {
    #[default]
    All,
    Active,
    Past,
    Cancelled,
}

impl ReservationBucket {
    pub fn matches(&self, row: &GameReservationRow, now: DateTime<Utc>) -> bool {
        match self {
            ReservationBucket::All => true,
            ReservationBucket::Active => row.is_active(now),
            ReservationBucket::Past => row.end_time <= now && !row.status.is_cancelled(),
            ReservationBucket::Cancelled => row.status.is_cancelled(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone)]
pub struct CreateGameReservation {
    pub user_id: Uuid,
    pub game_id: Uuid,
    pub game_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, user_id, game_id, game_name, start_time, end_time, status, created_at";

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateGameReservation,
) -> Result<GameReservationRow> {
    sqlx::query_as::<_, GameReservationRow>(&format!(
        r#"
        INSERT INTO game_reservations (user_id, game_id, game_name, start_time, end_time, status, created_at)
        VALUES ($1, $2, $3, $4, $5, 'confirmed', $6)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(data.user_id)
    .bind(data.game_id)
    .bind(data.game_name)
    .bind(data.start_time)
    .bind(data.end_time)
    .bind(data.created_at)
    .fetch_one(executor)
    .await
}

pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<GameReservationRow>> {
    sqlx::query_as::<_, GameReservationRow>(&format!(
        "SELECT {COLUMNS} FROM game_reservations WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Confirmed reservations of a game whose start falls inside `[from, to]`.
pub async fn list_confirmed_for_game_between<'e>(
    executor: impl PgExecutor<'e>,
    game_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<GameReservationRow>> {
    sqlx::query_as::<_, GameReservationRow>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM game_reservations
        WHERE game_id = $1
          AND status = 'confirmed'
          AND start_time >= $2
          AND start_time <= $3
        ORDER BY start_time ASC
        "#
    ))
    .bind(game_id)
    .bind(from)
    .bind(to)
    .fetch_all(executor)
    .await
}

pub async fn list_active_for_user<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Vec<GameReservationRow>> {
    sqlx::query_as::<_, GameReservationRow>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM game_reservations
        WHERE user_id = $1 AND status = 'confirmed' AND end_time > $2
        "#
    ))
    .bind(user_id)
    .bind(now)
    .fetch_all(executor)
    .await
}

/// Most recent reservation (by end time) that counts towards the cooldown.
pub async fn last_for_user_and_game<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    game_id: Uuid,
) -> Result<Option<GameReservationRow>> {
    sqlx::query_as::<_, GameReservationRow>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM game_reservations
        WHERE user_id = $1
          AND game_id = $2
          AND status IN ('confirmed', 'cancelled-by-user')
        ORDER BY end_time DESC
        LIMIT 1
        "#
    ))
    .bind(user_id)
    .bind(game_id)
    .fetch_optional(executor)
    .await
}

pub async fn find_confirmed_at_slot<'e>(
    executor: impl PgExecutor<'e>,
    game_id: Uuid,
    start_time: DateTime<Utc>,
) -> Result<Option<GameReservationRow>> {
    sqlx::query_as::<_, GameReservationRow>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM game_reservations
        WHERE game_id = $1 AND start_time = $2 AND status = 'confirmed'
        LIMIT 1
        "#
    ))
    .bind(game_id)
    .bind(start_time)
    .fetch_optional(executor)
    .await
}

/// Moves a confirmed reservation to `status`. Returns `None` when the row is
/// missing or no longer confirmed.
pub async fn transition_from_confirmed<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    status: ReservationStatus,
) -> Result<Option<GameReservationRow>> {
    sqlx::query_as::<_, GameReservationRow>(&format!(
        r#"
        UPDATE game_reservations
        SET status = $2
        WHERE id = $1 AND status = 'confirmed'
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(executor)
    .await
}

pub async fn list_for_user<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> Result<Vec<GameReservationRow>> {
    sqlx::query_as::<_, GameReservationRow>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM game_reservations
        WHERE user_id = $1
        ORDER BY start_time DESC
        "#
    ))
    .bind(user_id)
    .fetch_all(executor)
    .await
}

fn push_bucket_filter(
    query: &mut QueryBuilder<'_, Postgres>,
    bucket: ReservationBucket,
    now: DateTime<Utc>,
) {
    match bucket {
        ReservationBucket::All => {}
        ReservationBucket::Active => {
            query.push(" AND status = 'confirmed' AND end_time > ");
            query.push_bind(now);
        }
        ReservationBucket::Past => {
            query.push(" AND status = 'confirmed' AND end_time <= ");
            query.push_bind(now);
        }
        ReservationBucket::Cancelled => {
            query.push(" AND status <> 'confirmed'");
        }
    }
}

pub async fn list_all<'e>(
    executor: impl PgExecutor<'e>,
    bucket: ReservationBucket,
    order: SortOrder,
    now: DateTime<Utc>,
    page: LimitOffset,
) -> Result<Vec<GameReservationRow>> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {COLUMNS} FROM game_reservations WHERE 1=1"
    ));
    push_bucket_filter(&mut query, bucket, now);

    query.push(match order {
        SortOrder::Asc => " ORDER BY start_time ASC",
        SortOrder::Desc => " ORDER BY start_time DESC",
    });
    query.push(" LIMIT ");
    query.push_bind(page.limit);
    query.push(" OFFSET ");
    query.push_bind(page.offset);

    query
        .build_query_as::<GameReservationRow>()
        .fetch_all(executor)
        .await
}

pub async fn count_all<'e>(
    executor: impl PgExecutor<'e>,
    bucket: ReservationBucket,
    now: DateTime<Utc>,
) -> Result<i64> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM game_reservations WHERE 1=1");
    push_bucket_filter(&mut query, bucket, now);

    let (count,): (i64,) = query.build_query_as().fetch_one(executor).await?;
    Ok(count)
}
