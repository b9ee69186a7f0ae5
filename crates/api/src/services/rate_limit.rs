use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

/// Per-caller sliding-window counter for privileged operations.
///
/// Every attempt that is let through counts, whether or not the operation it
/// guards later succeeds.
#[derive(Clone)]
pub struct RollingWindowLimiter {
    limit: usize,
    window: Duration,
    attempts: Arc<Mutex<HashMap<Uuid, VecDeque<DateTime<Utc>>>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exhausted {
    pub retry_at: DateTime<Utc>,
}

impl RollingWindowLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            attempts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn hourly(limit: usize) -> Self {
        Self::new(limit, Duration::hours(1))
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record an attempt for `key` at `now`, or refuse if the window is full.
    pub fn try_acquire(&self, key: Uuid, now: DateTime<Utc>) -> Result<(), Exhausted> {
        let mut attempts = self.attempts.lock();
        let history = attempts.entry(key).or_default();

        while history.front().is_some_and(|t| *t <= now - self.window) {
            history.pop_front();
        }

        if history.len() >= self.limit {
            let oldest = history.front().copied().unwrap_or(now);
            return Err(Exhausted {
                retry_at: oldest + self.window,
            });
        }

        history.push_back(now);
        Ok(())
    }
}
