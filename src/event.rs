use crate::error::{Error, Result};
use chrono::{
    DateTime, Datelike as _, NaiveDate, NaiveDateTime, NaiveTime, TimeZone as _, Utc, Weekday,
};
use chrono_tz::Tz;

const DATE_FORMAT: &str = "%Y%m%d";
const LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Start of the event owning a recurrence rule.
///
/// All-day events carry a bare date and no timezone. Timed events carry an
/// instant in the zone the event was created in, which decides the local
/// date a rule is anchored to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventStart {
    AllDay(NaiveDate),
    Timed(DateTime<Tz>),
}

impl EventStart {
    /// Reads an event start as stored on the event: `YYYYMMDD` for all-day
    /// events, `YYYYMMDDTHHmmss` local to `tzid`, or `YYYYMMDDTHHmmssZ` in UTC.
    ///
    /// A local time without a `tzid` is taken as UTC.
    pub fn parse(value: &str, tzid: Option<&str>) -> Result<Self> {
        let timezone = match tzid {
            Some(tzid) => Some(
                tzid.parse::<Tz>()
                    .map_err(|_| Error::UnknownTimezone(tzid.to_owned()))?,
            ),
            None => None,
        };
        let invalid = || Error::InvalidStart(value.to_owned());

        if !value.contains(['T', 't']) {
            let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?;
            return Ok(match timezone {
                None => EventStart::AllDay(date),
                Some(tz) => EventStart::Timed(local_to_zoned(tz, date.and_time(NaiveTime::MIN))),
            });
        }

        if let Some(utc) = value.strip_suffix(['Z', 'z']) {
            let naive = NaiveDateTime::parse_from_str(utc, LOCAL_FORMAT).map_err(|_| invalid())?;
            let tz = timezone.unwrap_or(Tz::UTC);
            return Ok(EventStart::Timed(tz.from_utc_datetime(&naive)));
        }

        let naive = NaiveDateTime::parse_from_str(value, LOCAL_FORMAT).map_err(|_| invalid())?;
        Ok(EventStart::Timed(local_to_zoned(timezone.unwrap_or(Tz::UTC), naive)))
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, EventStart::AllDay(_))
    }

    /// Zone the start is expressed in; all-day events are anchored to UTC.
    pub fn timezone(&self) -> Tz {
        match self {
            EventStart::AllDay(_) => Tz::UTC,
            EventStart::Timed(start) => start.timezone(),
        }
    }

    /// Calendar date of the start, local to the event.
    pub fn date(&self) -> NaiveDate {
        match self {
            EventStart::AllDay(date) => *date,
            EventStart::Timed(start) => start.date_naive(),
        }
    }

    pub fn weekday(&self) -> Weekday {
        self.date().weekday()
    }

    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            EventStart::AllDay(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
            EventStart::Timed(start) => start.with_timezone(&Utc),
        }
    }

    /// Wall-clock `local` time in the event's zone.
    pub(crate) fn at_local(&self, local: NaiveDateTime) -> DateTime<Utc> {
        local_to_zoned(self.timezone(), local).with_timezone(&Utc)
    }

    /// Calendar date of `instant` as seen from the event.
    pub(crate) fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.timezone()).date_naive()
    }
}

// Times skipped by a DST change are read as UTC wall time instead of failing.
fn local_to_zoned(tz: Tz, local: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&local)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&local))
}
