pub mod books;
pub mod campuses;
pub mod game_reservations;
pub mod games;
pub mod leaderboards;
pub mod notifications;
pub mod transactions;
pub mod users;

pub use game_reservations::{
    CreateGameReservation, ReservationBucket, ReservationStatus, SortOrder,
};
pub use games::{CreateGameData, UpdateGameData};
pub use notifications::CreateNotification;
