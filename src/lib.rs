//! Round-trips calendar recurrence rules between RFC 5545 `RRULE` text and
//! the structured fields a recurrence form edits.
//!
//! ```
//! use rrule_form::{EventStart, Frequency, RecurrenceRule};
//!
//! let start = EventStart::parse("20240101T090000", Some("Europe/Berlin")).unwrap();
//! let rule = RecurrenceRule::deserialize(Some("FREQ=WEEKLY;BYDAY=MO,WE;INTERVAL=2"), &start);
//!
//! assert_eq!(rule.frequency, Frequency::Weekly);
//! assert_eq!(rule.interval, 2);
//! assert_eq!(
//!     rule.serialize(&start).as_deref(),
//!     Some("FREQ=WEEKLY;BYDAY=MO,WE;INTERVAL=2")
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod describe;
mod error;
mod event;
mod reschedule;
mod rrule;
mod weekdays;

#[cfg(test)]
mod test_helpers;

pub use describe::DescribeOptions;
pub use error::{Error, Result};
pub use event::EventStart;
pub use weekdays::WeekdayMask;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// The event does not repeat.
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// How a series ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum End {
    #[default]
    Never,
    Until(DateTime<Utc>),
    Count(u32),
}

/// Structured view of an event's `RRULE`.
///
/// `day_in_month` is a calendar day when `days` is empty, and the ordinal of
/// the selected weekday within the month otherwise (5 meaning "last").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: u32,
    pub days: WeekdayMask,
    pub day_in_month: i32,
    /// Zero-based, January is 0.
    pub month: i32,
    pub end: End,
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        RecurrenceRule {
            frequency: Frequency::None,
            interval: 1,
            days: WeekdayMask::new(),
            day_in_month: 0,
            month: 0,
            end: End::Never,
        }
    }
}

impl RecurrenceRule {
    pub fn is_recurring(&self) -> bool {
        self.frequency != Frequency::None
    }
}
