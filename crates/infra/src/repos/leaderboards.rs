use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Result};

use crate::models::LeaderboardRow;

pub const MONTHLY: &str = "monthly";

pub async fn get<'e>(executor: impl PgExecutor<'e>, id: &str) -> Result<Option<LeaderboardRow>> {
    sqlx::query_as::<_, LeaderboardRow>(
        "SELECT id, entries, updated_at FROM leaderboards WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Overwrite the summary row, creating it on first run.
pub async fn replace<'e>(
    executor: impl PgExecutor<'e>,
    id: &str,
    entries: serde_json::Value,
    updated_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO leaderboards (id, entries, updated_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO UPDATE
        SET entries = EXCLUDED.entries, updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(id)
    .bind(entries)
    .bind(updated_at)
    .execute(executor)
    .await?;
    Ok(())
}
