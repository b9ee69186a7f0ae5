use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use infra::models::{BorrowedBookRow, UserRow};
use infra::repos;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{error, info};
use uuid::Uuid;

use crate::services::reports::UNKNOWN_USER;

const UNKNOWN_CLASS: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub name: String,
    pub student_class: String,
    pub count: u64,
}

#[derive(Debug, Clone)]
pub struct MonthlyLeaderboard {
    pub entries: Vec<LeaderboardEntry>,
    pub updated_at: DateTime<Utc>,
}

/// Borrow counts per user for the local calendar month containing `now`.
pub fn compute_monthly(
    borrows: &[BorrowedBookRow],
    users: &[UserRow],
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Vec<LeaderboardEntry> {
    let local_now = now.with_timezone(&offset);
    let in_month = |at: DateTime<Utc>| {
        let local = at.with_timezone(&offset);
        local.year() == local_now.year() && local.month() == local_now.month()
    };

    let mut counts: HashMap<Uuid, u64> = HashMap::new();
    for borrow in borrows.iter().filter(|b| in_month(b.borrowed_at)) {
        *counts.entry(borrow.user_id).or_default() += 1;
    }

    let users: HashMap<Uuid, &UserRow> = users.iter().map(|u| (u.id, u)).collect();
    let mut entries: Vec<LeaderboardEntry> = counts
        .into_iter()
        .map(|(user_id, count)| {
            let user = users.get(&user_id);
            LeaderboardEntry {
                user_id,
                name: user
                    .and_then(|u| u.display_name.clone())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| UNKNOWN_USER.to_string()),
                student_class: user
                    .and_then(|u| u.student_class.clone())
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| UNKNOWN_CLASS.to_string()),
                count,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    entries
}

pub async fn load_monthly(db: &PgPool) -> Result<Option<MonthlyLeaderboard>, sqlx::Error> {
    let Some(row) = repos::leaderboards::get(db, repos::leaderboards::MONTHLY).await? else {
        return Ok(None);
    };
    let entries = serde_json::from_value(row.entries).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(Some(MonthlyLeaderboard {
        entries,
        updated_at: row.updated_at,
    }))
}

/// Periodically rebuilds the monthly leaderboard row.
pub struct LeaderboardService {
    db: PgPool,
    offset: FixedOffset,
    interval: Interval,
}

impl LeaderboardService {
    pub fn new(db: PgPool, offset: FixedOffset, every: Duration) -> Self {
        let mut interval = interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            db,
            offset,
            interval,
        }
    }

    pub async fn run(&mut self) {
        info!("Starting monthly leaderboard service");

        loop {
            self.interval.tick().await;

            if let Err(e) = self.refresh(Utc::now()).await {
                error!("Error updating monthly leaderboard: {}", e);
            }
        }
    }

    pub async fn refresh(&self, now: DateTime<Utc>) -> anyhow::Result<usize> {
        let (users, borrows) = tokio::try_join!(
            repos::users::list_all(&self.db),
            repos::books::list_all_borrows(&self.db),
        )?;

        let entries = compute_monthly(&borrows, &users, now, self.offset);
        let count = entries.len();
        repos::leaderboards::replace(
            &self.db,
            repos::leaderboards::MONTHLY,
            serde_json::to_value(&entries)?,
            now,
        )
        .await?;

        info!(entries = count, "monthly leaderboard updated");
        Ok(count)
    }
}

/// Spawn the leaderboard job as a background task
pub fn spawn_leaderboard_service(
    db: PgPool,
    offset: FixedOffset,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut service = LeaderboardService::new(db, offset, every);
        service.run().await;
    })
}
