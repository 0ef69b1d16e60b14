use chrono::Weekday;
use serde::{Deserialize, Serialize};

const DAYS_IN_WEEK: usize = 7;

/// Weekdays in mask order.
pub(crate) const WEEKDAYS: [Weekday; DAYS_IN_WEEK] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

const CODES: [&str; DAYS_IN_WEEK] = ["SU", "MO", "TU", "WE", "TH", "FR", "SA"];

const NAMES: [&str; DAYS_IN_WEEK] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// A set of weekdays, indexed from Sunday.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct WeekdayMask([bool; DAYS_IN_WEEK]);

impl WeekdayMask {
    pub fn new() -> Self {
        WeekdayMask::default()
    }

    pub fn all() -> Self {
        WeekdayMask([true; DAYS_IN_WEEK])
    }

    pub fn single(day: Weekday) -> Self {
        let mut mask = WeekdayMask::new();
        mask.insert(day);
        mask
    }

    pub fn weekend() -> Self {
        [Weekday::Sat, Weekday::Sun].into_iter().collect()
    }

    /// `length` consecutive days beginning at `first`, wrapping past Saturday.
    pub fn span(first: Weekday, length: u8) -> Self {
        let length = usize::from(length).min(DAYS_IN_WEEK);
        std::iter::successors(Some(first), |day| Some(day.succ()))
            .take(length)
            .collect()
    }

    /// Reads the 7-bit integer form, bit 0 being Sunday. Higher bits are ignored.
    pub fn from_bits(bits: u8) -> Self {
        let mut mask = WeekdayMask::new();
        for (index, set) in mask.0.iter_mut().enumerate() {
            *set = bits & (1 << index) != 0;
        }
        mask
    }

    pub fn bits(&self) -> u8 {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .fold(0, |bits, (index, _)| bits | (1 << index))
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0[index(day)] = true;
    }

    pub fn remove(&mut self, day: Weekday) {
        self.0[index(day)] = false;
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0[index(day)]
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|set| *set)
    }

    pub fn len(&self) -> usize {
        self.0.iter().filter(|set| **set).count()
    }

    /// Set days, Sunday first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.days_from(Weekday::Sun)
    }

    /// Set days, starting the week at `first`.
    pub fn days_from(&self, first: Weekday) -> impl Iterator<Item = Weekday> + '_ {
        std::iter::successors(Some(first), |day| Some(day.succ()))
            .take(DAYS_IN_WEEK)
            .filter(move |day| self.contains(*day))
    }

    /// Moves every set day `days` positions later in the week.
    pub fn rotate(&self, days: i64) -> Self {
        let shift = days.rem_euclid(DAYS_IN_WEEK as i64) as usize;
        let mut rotated = self.0;
        rotated.rotate_right(shift);
        WeekdayMask(rotated)
    }

    /// Upper-case RRULE codes, Sunday first, joined by commas.
    pub(crate) fn to_codes(&self) -> String {
        self.iter().map(code).collect::<Vec<_>>().join(",")
    }
}

impl FromIterator<Weekday> for WeekdayMask {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut mask = WeekdayMask::new();
        for day in iter {
            mask.insert(day);
        }
        mask
    }
}

impl From<u8> for WeekdayMask {
    fn from(bits: u8) -> Self {
        WeekdayMask::from_bits(bits)
    }
}

impl From<WeekdayMask> for u8 {
    fn from(mask: WeekdayMask) -> u8 {
        mask.bits()
    }
}

fn index(day: Weekday) -> usize {
    day.num_days_from_sunday() as usize
}

pub(crate) fn code(day: Weekday) -> &'static str {
    CODES[index(day)]
}

pub(crate) fn name(day: Weekday) -> &'static str {
    NAMES[index(day)]
}

/// Looks up a two letter RRULE weekday code, ignoring case.
pub(crate) fn from_code(code: &str) -> Option<Weekday> {
    CODES
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(code))
        .map(|index| WEEKDAYS[index])
}
