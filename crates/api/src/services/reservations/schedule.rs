use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};

/// Wall-clock time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    pub const fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// Local wall-clock time of an instant, seconds dropped.
    pub fn of(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local = instant.with_timezone(&offset);
        Self::new(local.hour(), local.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("expected HH:MM, got {s:?}"))?;
        let hour: u32 = h.parse().map_err(|_| format!("bad hour in {s:?}"))?;
        let minute: u32 = m.parse().map_err(|_| format!("bad minute in {s:?}"))?;
        if hour > 23 || minute > 59 {
            return Err(format!("out of range: {s:?}"));
        }
        Ok(Self::new(hour, minute))
    }
}

/// One recess period during which a game can be reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub start: ClockTime,
    pub end: ClockTime,
}

/// School-day breaks, in order. Process-wide and identical for every campus.
pub const DAILY_SLOTS: [Slot; 8] = [
    Slot::new(ClockTime::new(9, 55), ClockTime::new(10, 5)),
    Slot::new(ClockTime::new(10, 40), ClockTime::new(10, 50)),
    Slot::new(ClockTime::new(11, 25), ClockTime::new(11, 35)),
    Slot::new(ClockTime::new(12, 10), ClockTime::new(12, 20)),
    Slot::new(ClockTime::new(12, 55), ClockTime::new(13, 40)),
    Slot::new(ClockTime::new(14, 15), ClockTime::new(14, 25)),
    Slot::new(ClockTime::new(15, 0), ClockTime::new(15, 10)),
    Slot::new(ClockTime::new(15, 45), ClockTime::new(15, 50)),
];

impl Slot {
    pub const fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    /// `"HH:MM - HH:MM"`
    pub fn label(&self) -> String {
        format!("{} - {}", self.start, self.end)
    }

    /// Schedule slot starting at `start`, if there is one.
    pub fn starting_at(start: ClockTime) -> Option<Slot> {
        DAILY_SLOTS.iter().copied().find(|slot| slot.start == start)
    }

    /// Accepts either a bare start (`"09:55"`) or a full label (`"09:55 - 10:05"`).
    /// A full label must match the schedule exactly.
    pub fn parse(input: &str) -> Option<Slot> {
        match input.split_once('-') {
            Some((start, end)) => {
                let slot = Slot::starting_at(start.parse().ok()?)?;
                (slot.end == end.parse().ok()?).then_some(slot)
            }
            None => Slot::starting_at(input.parse().ok()?),
        }
    }

    /// Absolute start and end of this slot on a local calendar date.
    pub fn on(&self, date: NaiveDate, offset: FixedOffset) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((
            local_instant(date, self.start, offset)?,
            local_instant(date, self.end, offset)?,
        ))
    }
}

fn local_instant(date: NaiveDate, time: ClockTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(time.hour, time.minute, 0)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

/// `[00:00:00.000, 23:59:59.999]` of a local calendar date, in UTC.
pub fn day_bounds(date: NaiveDate, offset: FixedOffset) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = offset
        .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
        .single()?;
    let end = offset
        .from_local_datetime(&date.and_hms_milli_opt(23, 59, 59, 999)?)
        .single()?;
    Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

/// Local calendar date of an instant.
pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn istanbul() -> FixedOffset {
        FixedOffset::east_opt(3 * 3600).unwrap()
    }

    #[test]
    fn schedule_is_ordered_and_well_formed() {
        for pair in DAILY_SLOTS.windows(2) {
            assert!(pair[0].end < pair[1].start);
        }
        assert!(DAILY_SLOTS.iter().all(|s| s.start < s.end));
        assert_eq!(DAILY_SLOTS[4].label(), "12:55 - 13:40");
    }

    #[test]
    fn parses_labels_and_bare_starts() {
        assert_eq!(Slot::parse("09:55 - 10:05"), Some(DAILY_SLOTS[0]));
        assert_eq!(Slot::parse("15:45"), Some(DAILY_SLOTS[7]));
        assert_eq!(Slot::parse("09:55 - 10:10"), None);
        assert_eq!(Slot::parse("09:56"), None);
        assert_eq!(Slot::parse("garbage"), None);
    }

    #[test]
    fn slot_instants_follow_the_campus_offset() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let (start, end) = DAILY_SLOTS[0].on(date, istanbul()).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-06-10T06:55:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-06-10T07:05:00+00:00");
        assert_eq!(ClockTime::of(start, istanbul()).to_string(), "09:55");
    }

    #[test]
    fn day_bounds_cover_local_midnight_to_midnight() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let (from, to) = day_bounds(date, istanbul()).unwrap();
        assert_eq!(from.to_rfc3339(), "2025-06-09T21:00:00+00:00");
        assert_eq!(local_date(to, istanbul()), date);
        assert_eq!((to - from).num_milliseconds(), 24 * 3600 * 1000 - 1);
    }
}
