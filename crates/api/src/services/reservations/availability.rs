use std::collections::HashSet;

use chrono::FixedOffset;
use infra::models::GameReservationRow;
use infra::repos::ReservationStatus;

use super::schedule::{ClockTime, Slot, DAILY_SLOTS};

/// Schedule slots whose start does not coincide with the local start time of a
/// confirmed reservation. Only start times are compared; end times never are.
pub fn free_slots(reservations: &[GameReservationRow], offset: FixedOffset) -> Vec<Slot> {
    let taken: HashSet<ClockTime> = reservations
        .iter()
        .filter(|r| r.status == ReservationStatus::Confirmed)
        .map(|r| ClockTime::of(r.start_time, offset))
        .collect();

    DAILY_SLOTS
        .iter()
        .copied()
        .filter(|slot| !taken.contains(&slot.start))
        .collect()
}
