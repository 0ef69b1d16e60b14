use crate::{End, EventStart, Frequency, RecurrenceRule, WeekdayMask};
use chrono::Datelike as _;

impl RecurrenceRule {
    /// Moves the weekdays of a weekly rule along with its event.
    ///
    /// Every selected weekday advances by the number of days between the old
    /// and the new local start date, wrapping around the week. Rules that are
    /// not weekly are returned unchanged.
    pub fn shift_weekdays(&self, old: &EventStart, new: &EventStart) -> RecurrenceRule {
        let mut rule = self.clone();
        if rule.frequency == Frequency::Weekly {
            let delta = (new.date() - old.date()).num_days();
            rule.days = rule.days.rotate(delta);
        }
        rule
    }

    /// Adjusts the rule after its event moved from `old` to `new`.
    ///
    /// Weekly rules shift their weekdays. Monthly and yearly rules follow the
    /// new date: by weekday they take the new weekday and its position in the
    /// month, by date they take the new day (and yearly rules the new month).
    /// An `UNTIL` before the new start no longer bounds anything and is dropped.
    pub fn reschedule(&self, old: &EventStart, new: &EventStart) -> RecurrenceRule {
        if !self.is_recurring() {
            return self.clone();
        }

        let mut rule = self.shift_weekdays(old, new);
        let date = new.date();

        if let Frequency::Monthly | Frequency::Yearly = rule.frequency {
            if rule.days.is_empty() {
                rule.day_in_month = date.day() as i32;
            } else {
                rule.day_in_month = date.day0() as i32 / 7 + 1;
                rule.days = WeekdayMask::single(date.weekday());
            }
        }

        if rule.frequency == Frequency::Yearly {
            rule.month = date.month0() as i32;
        }

        if let End::Until(until) = rule.end {
            if until < new.instant() {
                rule.end = End::Never;
            }
        }

        rule
    }
}
