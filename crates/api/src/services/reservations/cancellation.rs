use chrono::{DateTime, Duration, Utc};
use infra::models::GameReservationRow;
use infra::repos::ReservationStatus;
use uuid::Uuid;

use super::ReservationError;

/// How long after booking the owner may still cancel.
pub const SELF_CANCEL_WINDOW: Duration = Duration::hours(1);

/// True while the reservation is confirmed and younger than the window.
pub fn within_self_cancel_window(row: &GameReservationRow, now: DateTime<Utc>) -> bool {
    row.status == ReservationStatus::Confirmed && now - row.created_at < SELF_CANCEL_WINDOW
}

pub fn check_self_cancel(
    row: &GameReservationRow,
    caller: Uuid,
    now: DateTime<Utc>,
) -> Result<(), ReservationError> {
    if row.user_id != caller {
        return Err(ReservationError::NotOwner);
    }
    if row.status != ReservationStatus::Confirmed {
        return Err(ReservationError::NotConfirmed);
    }
    if !within_self_cancel_window(row, now) {
        return Err(ReservationError::CancellationWindowClosed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn booked_at(created_at: DateTime<Utc>, owner: Uuid) -> GameReservationRow {
        GameReservationRow {
            id: Uuid::new_v4(),
            user_id: owner,
            game_id: Uuid::new_v4(),
            game_name: "Satranç".into(),
            start_time: created_at + Duration::days(1),
            end_time: created_at + Duration::days(1) + Duration::minutes(10),
            status: ReservationStatus::Confirmed,
            created_at,
        }
    }

    #[test]
    fn window_is_strictly_under_an_hour() {
        let owner = Uuid::new_v4();
        let created = Utc.with_ymd_and_hms(2025, 6, 10, 6, 0, 0).unwrap();
        let row = booked_at(created, owner);

        assert!(check_self_cancel(&row, owner, created + Duration::minutes(59)).is_ok());
        assert!(matches!(
            check_self_cancel(&row, owner, created + SELF_CANCEL_WINDOW),
            Err(ReservationError::CancellationWindowClosed)
        ));
    }

    #[test]
    fn only_owner_may_cancel_confirmed_rows() {
        let owner = Uuid::new_v4();
        let created = Utc.with_ymd_and_hms(2025, 6, 10, 6, 0, 0).unwrap();
        let mut row = booked_at(created, owner);

        assert!(matches!(
            check_self_cancel(&row, Uuid::new_v4(), created),
            Err(ReservationError::NotOwner)
        ));

        row.status = ReservationStatus::CancelledByAdmin;
        assert!(matches!(
            check_self_cancel(&row, owner, created),
            Err(ReservationError::NotConfirmed)
        ));
    }
}
