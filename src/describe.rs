use crate::{
    rrule::LAST,
    weekdays::{self, WeekdayMask},
    End, EventStart, Frequency, RecurrenceRule,
};
use chrono::{Month, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::debug;

const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

/// Locale settings used when rendering descriptions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescribeOptions {
    /// First day of the week; weekday lists are ordered from it.
    pub week_start: Weekday,
    pub workweek_start: Weekday,
    /// Number of consecutive days, from `workweek_start`, that are workdays.
    pub workweek_length: u8,
    /// `strftime`-style format for the date a series ends on.
    pub date_format: String,
}

impl Default for DescribeOptions {
    fn default() -> Self {
        DescribeOptions {
            week_start: Weekday::Sun,
            workweek_start: Weekday::Mon,
            workweek_length: 5,
            date_format: "%-m/%-d/%Y".to_owned(),
        }
    }
}

impl DescribeOptions {
    fn workweek(&self) -> WeekdayMask {
        WeekdayMask::span(self.workweek_start, self.workweek_length)
    }

    fn format_date(&self, date: NaiveDate) -> String {
        let mut formatted = String::new();
        if write!(formatted, "{}", date.format(&self.date_format)).is_err() {
            debug!(format = %self.date_format, "invalid date format");
            return date.format(FALLBACK_DATE_FORMAT).to_string();
        }
        formatted
    }
}

impl RecurrenceRule {
    /// English sentence describing the rule, followed by how the series ends.
    ///
    /// Non-recurring rules describe as an empty string.
    pub fn describe(&self, start: &EventStart, options: &DescribeOptions) -> String {
        let interval = self.interval.max(1);
        let description = match self.frequency {
            Frequency::None => return String::new(),
            Frequency::Daily => every(interval, "day", "."),
            Frequency::Weekly => self.describe_weekly(interval, options),
            Frequency::Monthly if self.days.is_empty() => {
                every(interval, "month", &format!(" on day {}.", self.day_in_month))
            }
            Frequency::Monthly => every(
                interval,
                "month",
                &format!(
                    " on the {} {}.",
                    ordinal(self.day_in_month),
                    day_list(&self.days, options.week_start)
                ),
            ),
            Frequency::Yearly if self.days.is_empty() => format!(
                "Every year in {} on day {}.",
                month_name(self.month),
                self.day_in_month
            ),
            Frequency::Yearly => format!(
                "Every year on the {} {} in {}.",
                ordinal(self.day_in_month),
                day_list(&self.days, options.week_start),
                month_name(self.month)
            ),
        };

        match self.end {
            End::Never => description,
            _ => format!("{} {}", description, self.describe_end(start, options)),
        }
    }

    /// How the series ends, as a sentence of its own.
    pub fn describe_end(&self, start: &EventStart, options: &DescribeOptions) -> String {
        match self.end {
            End::Never => "The series never ends.".to_owned(),
            End::Until(until) => format!(
                "The series ends on {}.",
                options.format_date(start.local_date(until))
            ),
            End::Count(1) => "The series ends after 1 occurrence.".to_owned(),
            End::Count(count) => format!("The series ends after {} occurrences.", count),
        }
    }

    fn describe_weekly(&self, interval: u32, options: &DescribeOptions) -> String {
        let days = self.days;

        if days == WeekdayMask::all() {
            return match interval {
                1 => "Every day.".to_owned(),
                _ => format!("Every {} weeks on all days.", interval),
            };
        }
        if days == options.workweek() {
            return match interval {
                1 => "On workdays.".to_owned(),
                _ => format!("Every {} weeks on workdays.", interval),
            };
        }
        if days == WeekdayMask::weekend() {
            return match interval {
                1 => "Every weekend.".to_owned(),
                _ => format!("Every {} weeks on weekends.", interval),
            };
        }
        if days.is_empty() {
            return every(interval, "week", ".");
        }

        let list = day_list(&days, options.week_start);
        match interval {
            1 => format!("Every {}.", list),
            _ => format!("Every {} weeks on {}.", interval, list),
        }
    }
}

/// "Every day." or "Every 3 days.", followed by `rest`.
fn every(interval: u32, unit: &str, rest: &str) -> String {
    match interval {
        1 => format!("Every {}{}", unit, rest),
        _ => format!("Every {} {}s{}", interval, unit, rest),
    }
}

fn day_list(days: &WeekdayMask, week_start: Weekday) -> String {
    let names: Vec<_> = days.days_from(week_start).map(weekdays::name).collect();
    match names.len() {
        2 => names.join(" and "),
        _ => names.join(", "),
    }
}

fn ordinal(position: i32) -> &'static str {
    match position {
        1 => "first",
        2 => "second",
        3 => "third",
        4 => "fourth",
        LAST | -1 => "fifth / last",
        _ => "",
    }
}

fn month_name(month: i32) -> &'static str {
    u8::try_from(month + 1)
        .ok()
        .and_then(|month| Month::try_from(month).ok())
        .map(|month| month.name())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use chrono::{TimeZone as _, Utc};

    fn describe(text: &str) -> String {
        let start = monday_morning();
        RecurrenceRule::deserialize(Some(text), &start)
            .describe(&start, &DescribeOptions::default())
    }

    #[test]
    fn daily() {
        assert_eq!(describe("FREQ=DAILY"), "Every day.");
        assert_eq!(describe("FREQ=DAILY;INTERVAL=3"), "Every 3 days.");
    }

    #[test]
    fn weekly_day_lists() {
        assert_eq!(
            describe("FREQ=WEEKLY;BYDAY=MO,TU,WE;INTERVAL=2"),
            "Every 2 weeks on Monday, Tuesday, Wednesday."
        );
        assert_eq!(describe("FREQ=WEEKLY;BYDAY=FR,MO"), "Every Monday and Friday.");
        assert_eq!(describe("FREQ=WEEKLY;BYDAY=TH"), "Every Thursday.");
    }

    #[test]
    fn weekly_special_cases() {
        assert_eq!(describe("FREQ=WEEKLY;BYDAY=SA,SU"), "Every weekend.");
        assert_eq!(describe("FREQ=WEEKLY;BYDAY=SA,SU;INTERVAL=2"), "Every 2 weeks on weekends.");
        assert_eq!(describe("FREQ=WEEKLY;BYDAY=SU,MO,TU,WE,TH,FR,SA"), "Every day.");
        assert_eq!(
            describe("FREQ=WEEKLY;BYDAY=SU,MO,TU,WE,TH,FR,SA;INTERVAL=4"),
            "Every 4 weeks on all days."
        );
        assert_eq!(describe("FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR"), "On workdays.");
        assert_eq!(
            describe("FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR;INTERVAL=2"),
            "Every 2 weeks on workdays."
        );
        assert_eq!(describe("FREQ=WEEKLY;BYDAY=XX;INTERVAL=2"), "Every 2 weeks.");
    }

    #[test]
    fn week_start_and_workweek_are_configurable() {
        let start = monday_morning();
        let options = DescribeOptions {
            week_start: Weekday::Mon,
            workweek_start: Weekday::Sun,
            ..DescribeOptions::default()
        };

        let rule = RecurrenceRule::deserialize(Some("FREQ=WEEKLY;BYDAY=SU,MO,FR"), &start);
        assert_eq!(rule.describe(&start, &options), "Every Monday, Friday, Sunday.");

        let rule = RecurrenceRule::deserialize(Some("FREQ=WEEKLY;BYDAY=SU,MO,TU,WE,TH"), &start);
        assert_eq!(rule.describe(&start, &options), "On workdays.");
    }

    #[test]
    fn monthly() {
        assert_eq!(describe("FREQ=MONTHLY;BYMONTHDAY=18"), "Every month on day 18.");
        assert_eq!(
            describe("FREQ=MONTHLY;BYMONTHDAY=18;INTERVAL=5"),
            "Every 5 months on day 18."
        );
        assert_eq!(
            describe("FREQ=MONTHLY;BYDAY=TU;BYSETPOS=2"),
            "Every month on the second Tuesday."
        );
        assert_eq!(
            describe("FREQ=MONTHLY;BYDAY=SU;BYSETPOS=-1"),
            "Every month on the fifth / last Sunday."
        );
        assert_eq!(
            describe("FREQ=MONTHLY;BYDAY=TU;BYSETPOS=2;INTERVAL=3"),
            "Every 3 months on the second Tuesday."
        );
    }

    #[test]
    fn yearly() {
        assert_eq!(
            describe("FREQ=YEARLY;BYMONTH=12;BYMONTHDAY=3"),
            "Every year in December on day 3."
        );
        assert_eq!(
            describe("FREQ=YEARLY;BYMONTH=12;BYDAY=TU;BYSETPOS=1"),
            "Every year on the first Tuesday in December."
        );
    }

    #[test]
    fn non_recurring_is_empty() {
        assert_eq!(describe("FREQ=SECONDLY;COUNT=3"), "");
    }

    #[test]
    fn end_clauses() {
        assert_eq!(
            describe("FREQ=DAILY;COUNT=3"),
            "Every day. The series ends after 3 occurrences."
        );
        assert_eq!(
            describe("FREQ=DAILY;COUNT=1"),
            "Every day. The series ends after 1 occurrence."
        );
        // 22:59:59 UTC is 23:59:59 in Berlin, still the 31st
        assert_eq!(
            describe("FREQ=WEEKLY;BYDAY=MO;UNTIL=20240131T225959Z"),
            "Every Monday. The series ends on 1/31/2024."
        );
    }

    #[test]
    fn all_day_end_date() {
        let start = all_day(2024, 1, 1);
        let rule = RecurrenceRule::deserialize(Some("FREQ=DAILY;UNTIL=20240331"), &start);
        assert_eq!(
            rule.describe_end(&start, &DescribeOptions::default()),
            "The series ends on 3/31/2024."
        );
    }

    #[test]
    fn never_ending() {
        let start = monday_morning();
        let rule = RecurrenceRule::deserialize(Some("FREQ=DAILY"), &start);
        assert_eq!(
            rule.describe_end(&start, &DescribeOptions::default()),
            "The series never ends."
        );
    }

    #[test_log::test]
    fn bad_date_format_falls_back() {
        let start = all_day(2024, 1, 1);
        let rule = RecurrenceRule {
            frequency: Frequency::Daily,
            end: End::Until(Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap()),
            ..RecurrenceRule::default()
        };
        let options = DescribeOptions {
            date_format: "%Q".to_owned(),
            ..DescribeOptions::default()
        };
        assert_eq!(
            rule.describe(&start, &options),
            "Every day. The series ends on 2024-03-31."
        );
    }

    #[test]
    fn options_from_settings() {
        let options: DescribeOptions =
            serde_json::from_str(r#"{"week_start": "Mon", "date_format": "%d.%m.%Y"}"#).unwrap();
        assert_eq!(options.week_start, Weekday::Mon);
        assert_eq!(options.workweek_length, 5);
        assert_eq!(options.format_date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()), "09.03.2024");
    }
}
