use crate::{EventStart, WeekdayMask};
use chrono::{NaiveDate, TimeZone as _, Weekday};

/// 2024-01-01 09:00 in Berlin, a Monday.
pub fn monday_morning() -> EventStart {
    timed(2024, 1, 1, 9)
}

pub fn timed(year: i32, month: u32, day: u32, hour: u32) -> EventStart {
    let start = chrono_tz::Europe::Berlin
        .with_ymd_and_hms(year, month, day, hour, 0, 0)
        .unwrap();
    EventStart::Timed(start)
}

pub fn all_day(year: i32, month: u32, day: u32) -> EventStart {
    EventStart::AllDay(NaiveDate::from_ymd_opt(year, month, day).unwrap())
}

pub fn days(days: &[Weekday]) -> WeekdayMask {
    days.iter().copied().collect()
}
