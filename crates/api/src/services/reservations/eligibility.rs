use chrono::{DateTime, Duration, Utc};
use infra::models::GameReservationRow;

/// Minimum gap between the end of a user's reservation of a game and the next one.
pub const COOLDOWN: Duration = Duration::hours(24);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// The user already holds a confirmed reservation that has not ended.
    ActiveReservation,
    /// The user's last reservation of this game ended within the cooldown.
    Cooldown { resumes_at: DateTime<Utc> },
}

/// Both booking rules, evaluated against already-loaded rows.
///
/// `active` is the user's reservations as returned by the store; rows that are
/// not actually active at `now` are ignored. `last_for_game` is the most recent
/// (by end time) confirmed or user-cancelled reservation of the same game.
pub fn evaluate(
    active: &[GameReservationRow],
    last_for_game: Option<&GameReservationRow>,
    now: DateTime<Utc>,
) -> Result<(), Denial> {
    if active.iter().any(|r| r.is_active(now)) {
        return Err(Denial::ActiveReservation);
    }

    if let Some(last) = last_for_game.filter(|r| r.status.counts_for_cooldown()) {
        if last.end_time > now - COOLDOWN {
            return Err(Denial::Cooldown {
                resumes_at: last.end_time + COOLDOWN,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use infra::repos::ReservationStatus;
    use uuid::Uuid;

    fn row(end: DateTime<Utc>, status: ReservationStatus) -> GameReservationRow {
        GameReservationRow {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            game_id: Uuid::nil(),
            game_name: "Catan".into(),
            start_time: end - Duration::minutes(10),
            end_time: end,
            status,
            created_at: end - Duration::days(2),
        }
    }

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 7, 5, 0).unwrap()
    }

    #[test]
    fn active_reservation_blocks() {
        let active = row(t(), ReservationStatus::Confirmed);
        let now = t() - Duration::minutes(30);
        assert_eq!(
            evaluate(std::slice::from_ref(&active), None, now),
            Err(Denial::ActiveReservation)
        );
    }

    #[test]
    fn ended_reservation_is_not_active() {
        let done = row(t(), ReservationStatus::Confirmed);
        assert_eq!(evaluate(&[done], None, t()), Ok(()));
    }

    #[test]
    fn cooldown_boundary_is_strict() {
        let last = row(t(), ReservationStatus::Confirmed);

        let just_before = t() + COOLDOWN - Duration::seconds(1);
        assert_eq!(
            evaluate(&[], Some(&last), just_before),
            Err(Denial::Cooldown {
                resumes_at: t() + COOLDOWN
            })
        );
        assert_eq!(evaluate(&[], Some(&last), t() + COOLDOWN), Ok(()));
    }

    #[test]
    fn user_cancellation_still_counts_but_admin_cancellation_does_not() {
        let now = t() + Duration::hours(1);
        let by_user = row(t(), ReservationStatus::CancelledByUser);
        let by_admin = row(t(), ReservationStatus::CancelledByAdmin);

        assert!(matches!(
            evaluate(&[], Some(&by_user), now),
            Err(Denial::Cooldown { .. })
        ));
        assert_eq!(evaluate(&[], Some(&by_admin), now), Ok(()));
    }
}
