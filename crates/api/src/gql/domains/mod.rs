// Each domain contains: mod.rs, resolvers.rs, types.rs

pub mod games;
pub mod leaderboards;
pub mod notifications;
pub mod reports;
pub mod reservations;
pub mod users;
