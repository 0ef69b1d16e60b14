use crate::{
    weekdays::{self, WeekdayMask},
    End, EventStart, Frequency, RecurrenceRule,
};
use chrono::{DateTime, Datelike as _, NaiveDate, NaiveDateTime, NaiveTime, TimeZone as _, Utc};
use std::collections::HashMap;
use tracing::{debug, trace};

const UNTIL_DATE_FORMAT: &str = "%Y%m%d";
const UNTIL_LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";
const UNTIL_UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Ordinal used for "last weekday of the month".
pub(crate) const LAST: i32 = 5;

impl RecurrenceRule {
    /// Reads `text` as an `RRULE` value.
    ///
    /// Fields the rule leaves open fall back to `start`: a weekly rule without
    /// `BYDAY` repeats on the start's weekday, a monthly or yearly rule without
    /// day selection repeats on the start's day (and month).
    ///
    /// Never fails. Malformed numbers fall back to their defaults and an
    /// unknown `FREQ` yields a non-recurring rule.
    pub fn deserialize(text: Option<&str>, start: &EventStart) -> Self {
        let text = match text.map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => return RecurrenceRule::default(),
        };

        let parts = Parts::split(text);
        let mut rule = RecurrenceRule::default();

        match parts.get("FREQ").map(str::to_ascii_uppercase).as_deref() {
            Some("DAILY") => rule.frequency = Frequency::Daily,
            Some("WEEKLY") => {
                rule.frequency = Frequency::Weekly;
                rule.days = match parts.get("BYDAY") {
                    Some(byday) => parse_days(byday),
                    None => WeekdayMask::single(start.weekday()),
                };
            }
            Some("MONTHLY") => {
                rule.frequency = Frequency::Monthly;
                if let Some(bymonthday) = parts.get("BYMONTHDAY") {
                    rule.day_in_month = int_or(bymonthday, 0);
                } else if let Some(byday) = parts.get("BYDAY") {
                    rule.select_weekday(byday, parts.get("BYSETPOS"));
                } else {
                    rule.day_in_month = start.date().day() as i32;
                }
            }
            Some("YEARLY") => {
                rule.frequency = Frequency::Yearly;
                let month = int_or(parts.get("BYMONTH").unwrap_or_default(), 0).saturating_sub(1);
                if let Some(bymonthday) = parts.get("BYMONTHDAY") {
                    rule.month = month;
                    rule.day_in_month = int_or(bymonthday, 0);
                } else if let Some(byday) = parts.get("BYDAY") {
                    rule.month = month;
                    rule.select_weekday(byday, parts.get("BYSETPOS"));
                } else {
                    rule.month = start.date().month0() as i32;
                    rule.day_in_month = start.date().day() as i32;
                }
            }
            other => debug!(freq = ?other, "unsupported frequency, rule does not repeat"),
        }

        rule.end = if let Some(count) = parts.get("COUNT") {
            End::Count(
                parse_int(count)
                    .and_then(|count| u32::try_from(count).ok())
                    .filter(|count| *count > 0)
                    .unwrap_or(1),
            )
        } else if let Some(until) = parts.get("UNTIL") {
            End::Until(parse_until(until, start).unwrap_or_else(|| {
                debug!(until, "unreadable UNTIL, falling back to the epoch");
                DateTime::<Utc>::UNIX_EPOCH
            }))
        } else {
            End::Never
        };

        rule.interval = parts
            .get("INTERVAL")
            .and_then(parse_int)
            .and_then(|interval| u32::try_from(interval).ok())
            .filter(|interval| *interval > 0)
            .unwrap_or(1);

        trace!(text, ?rule, "deserialized rule");
        rule
    }

    /// Writes the rule as an `RRULE` value, or `None` when it does not repeat.
    ///
    /// `start` decides how `UNTIL` is written: a bare date for all-day events,
    /// a UTC date-time otherwise.
    pub fn serialize(&self, start: &EventStart) -> Option<String> {
        let mut args = Vec::new();

        match self.frequency {
            Frequency::None => return None,
            Frequency::Daily => args.push("FREQ=DAILY".to_owned()),
            Frequency::Weekly => {
                args.push("FREQ=WEEKLY".to_owned());
                args.push(format!("BYDAY={}", self.days.to_codes()));
            }
            Frequency::Monthly => {
                args.push("FREQ=MONTHLY".to_owned());
                self.push_day_selection(&mut args);
            }
            Frequency::Yearly => {
                args.push("FREQ=YEARLY".to_owned());
                args.push(format!("BYMONTH={}", self.month + 1));
                self.push_day_selection(&mut args);
            }
        }

        if self.interval > 1 {
            args.push(format!("INTERVAL={}", self.interval));
        }

        match self.end {
            End::Never => {}
            End::Until(until) if start.is_all_day() => {
                args.push(format!("UNTIL={}", until.format(UNTIL_DATE_FORMAT)));
            }
            End::Until(until) => args.push(format!("UNTIL={}", until.format(UNTIL_UTC_FORMAT))),
            End::Count(count) => args.push(format!("COUNT={}", count)),
        }

        Some(args.join(";"))
    }

    fn select_weekday(&mut self, byday: &str, bysetpos: Option<&str>) {
        self.day_in_month = match bysetpos.and_then(parse_int) {
            Some(-1) => LAST,
            Some(pos) => pos,
            None => 0,
        };

        let code = byday.split(',').next().unwrap_or_default().trim();
        self.days = match weekdays::from_code(code) {
            Some(day) => WeekdayMask::single(day),
            None => {
                debug!(byday, "unknown weekday code");
                WeekdayMask::new()
            }
        };
    }

    fn push_day_selection(&self, args: &mut Vec<String>) {
        if self.days.is_empty() {
            args.push(format!("BYMONTHDAY={}", self.day_in_month));
        } else {
            let pos = if self.day_in_month == LAST { -1 } else { self.day_in_month };
            args.push(format!("BYDAY={}", self.days.to_codes()));
            args.push(format!("BYSETPOS={}", pos));
        }
    }
}

/// `KEY=VALUE` entries of a rule, keyed by upper-cased name.
struct Parts(HashMap<String, String>);

impl Parts {
    fn split(text: &str) -> Self {
        let mut parts = HashMap::new();

        for entry in text.split(';').map(str::trim).filter(|entry| !entry.is_empty()) {
            match entry.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    parts.insert(key.trim().to_ascii_uppercase(), value.trim().to_owned());
                }
                _ => debug!(entry, "skipping malformed rule entry"),
            }
        }

        // An ordinal written into the weekday token ("-1MO") stands in for BYSETPOS.
        if !parts.contains_key("BYSETPOS") {
            if let Some(byday) = parts.get("BYDAY") {
                let split = byday.len().wrapping_sub(2);
                if !byday.contains(',') && byday.len() > 2 && byday.is_char_boundary(split) {
                    let (pos, day) = byday.split_at(split);
                    let (pos, day) = (pos.to_owned(), day.to_owned());
                    parts.insert("BYSETPOS".to_owned(), pos);
                    parts.insert("BYDAY".to_owned(), day);
                }
            }
        }

        Parts(parts)
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

fn parse_days(byday: &str) -> WeekdayMask {
    byday
        .split(',')
        .map(str::trim)
        .filter_map(|code| {
            let day = weekdays::from_code(code);
            if day.is_none() {
                debug!(code, "ignoring unknown weekday code");
            }
            day
        })
        .collect()
}

/// Reads a leading integer: optional sign then digits, ignoring whatever follows.
fn parse_int(value: &str) -> Option<i32> {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        debug!(value, "not a number");
        return None;
    }

    let magnitude: i32 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Leading integer of `value`, or `default` when it is missing or zero.
fn int_or(value: &str, default: i32) -> i32 {
    parse_int(value).filter(|n| *n != 0).unwrap_or(default)
}

fn parse_until(value: &str, start: &EventStart) -> Option<DateTime<Utc>> {
    // a bare date is midnight UTC, whatever the event
    if !value.contains(['T', 't']) {
        let date = NaiveDate::parse_from_str(value, UNTIL_DATE_FORMAT).ok()?;
        return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }

    let upper = value.to_ascii_uppercase();
    match upper.strip_suffix('Z') {
        Some(utc) => {
            let naive = NaiveDateTime::parse_from_str(utc, UNTIL_LOCAL_FORMAT).ok()?;
            Some(Utc.from_utc_datetime(&naive))
        }
        None => {
            let naive = NaiveDateTime::parse_from_str(&upper, UNTIL_LOCAL_FORMAT).ok()?;
            Some(start.at_local(naive))
        }
    }
}
