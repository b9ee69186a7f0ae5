use async_graphql::{SimpleObject, ID};
use chrono::{DateTime, Utc};

use crate::services::leaderboard_service;

#[derive(SimpleObject, Clone, Debug)]
pub struct LeaderboardEntry {
    pub rank: i32, // 1-based
    pub user_id: ID,
    pub name: String,
    pub student_class: String,
    pub count: i32,
}

#[derive(SimpleObject, Clone, Debug)]
pub struct MonthlyLeaderboard {
    pub entries: Vec<LeaderboardEntry>,
    pub updated_at: DateTime<Utc>,
}

impl From<leaderboard_service::MonthlyLeaderboard> for MonthlyLeaderboard {
    fn from(board: leaderboard_service::MonthlyLeaderboard) -> Self {
        Self {
            entries: board
                .entries
                .into_iter()
                .enumerate()
                .map(|(index, entry)| LeaderboardEntry {
                    rank: index as i32 + 1,
                    user_id: entry.user_id.into(),
                    name: entry.name,
                    student_class: entry.student_class,
                    count: i32::try_from(entry.count).unwrap_or(i32::MAX),
                })
                .collect(),
            updated_at: board.updated_at,
        }
    }
}
