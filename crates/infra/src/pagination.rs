#[derive(Debug, Clone, Copy)]
pub struct LimitOffset {
    pub limit: i64,
    pub offset: i64,
}

impl Default for LimitOffset {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
        }
    }
}

impl LimitOffset {
    /// Clamp caller-supplied values into a sane window.
    pub fn clamped(limit: Option<i64>, offset: Option<i64>, default_limit: i64) -> Self {
        Self {
            limit: limit.unwrap_or(default_limit).clamp(1, 200),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}
