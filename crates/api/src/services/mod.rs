pub mod image_proxy;
pub mod leaderboard_service;
pub mod notification_service;
pub mod rate_limit;
pub mod reports;
pub mod reservations;
pub mod user_admin;

pub use image_proxy::ImageProxy;
pub use leaderboard_service::{spawn_leaderboard_service, LeaderboardService};
pub use notification_service::{NotificationHub, NotificationService};
pub use rate_limit::RollingWindowLimiter;
pub use reports::ReportService;
pub use reservations::ReservationService;
pub use user_admin::UserAdminService;
