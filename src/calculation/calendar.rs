//! Holiday and weekend classification.
//!
//! Holidays are resolved per year: fixed month-day holidays (optionally only
//! from a given year onward), movable feasts anchored on Easter Sunday, and
//! any extra dated holidays supplied through configuration.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// The kind of calendar day a punch falls on.
///
/// # Example
///
/// ```
/// use timebank_engine::calculation::{DayKind, HolidayCalendar};
/// use chrono::NaiveDate;
///
/// let calendar = HolidayCalendar::national();
/// let christmas = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
/// assert_eq!(calendar.day_kind(christmas), DayKind::Holiday);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    /// Monday through Friday, not a holiday.
    Workday,
    /// Saturday, not a holiday.
    Saturday,
    /// Sunday, not a holiday.
    Sunday,
    /// A public holiday, whatever the weekday.
    Holiday,
}

impl std::fmt::Display for DayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayKind::Workday => write!(f, "Workday"),
            DayKind::Saturday => write!(f, "Saturday"),
            DayKind::Sunday => write!(f, "Sunday"),
            DayKind::Holiday => write!(f, "Holiday"),
        }
    }
}

/// How a holiday's date is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayRule {
    /// Same month and day every year, optionally only from `since` onward.
    Fixed {
        /// Month (1-12).
        month: u32,
        /// Day of month.
        day: u32,
        /// First year the holiday is observed.
        since: Option<i32>,
    },
    /// A signed day offset from Easter Sunday.
    EasterOffset {
        /// Days after (positive) or before (negative) Easter Sunday.
        days: i64,
    },
}

/// A named holiday rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayDefinition {
    /// Holiday name.
    pub name: String,
    /// Date rule.
    pub rule: HolidayRule,
}

impl HolidayDefinition {
    fn fixed(name: &str, month: u32, day: u32, since: Option<i32>) -> Self {
        Self {
            name: name.to_string(),
            rule: HolidayRule::Fixed { month, day, since },
        }
    }

    fn easter(name: &str, days: i64) -> Self {
        Self {
            name: name.to_string(),
            rule: HolidayRule::EasterOffset { days },
        }
    }

    /// The date this holiday falls on in `year`, if observed that year.
    pub fn date_in(&self, year: i32) -> Option<NaiveDate> {
        match self.rule {
            HolidayRule::Fixed { month, day, since } => {
                if since.is_some_and(|first| year < first) {
                    return None;
                }
                NaiveDate::from_ymd_opt(year, month, day)
            }
            HolidayRule::EasterOffset { days } => {
                easter_sunday(year).map(|easter| easter + Duration::days(days))
            }
        }
    }
}

/// A holiday resolved to a concrete date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicHoliday {
    /// The date of the holiday.
    pub date: NaiveDate,
    /// The name of the holiday.
    pub name: String,
}

/// A year-aware holiday calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayCalendar {
    definitions: Vec<HolidayDefinition>,
    extra: Vec<PublicHoliday>,
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::national()
    }
}

impl HolidayCalendar {
    /// Fixed national holidays only.
    pub fn fixed_only() -> Self {
        Self {
            definitions: vec![
                HolidayDefinition::fixed("New Year's Day", 1, 1, None),
                HolidayDefinition::fixed("Tiradentes", 4, 21, None),
                HolidayDefinition::fixed("Labour Day", 5, 1, None),
                HolidayDefinition::fixed("Independence Day", 9, 7, None),
                HolidayDefinition::fixed("Our Lady of Aparecida", 10, 12, None),
                HolidayDefinition::fixed("All Souls' Day", 11, 2, None),
                HolidayDefinition::fixed("Republic Day", 11, 15, None),
                HolidayDefinition::fixed("Black Consciousness Day", 11, 20, Some(2024)),
                HolidayDefinition::fixed("Christmas Day", 12, 25, None),
            ],
            extra: Vec::new(),
        }
    }

    /// Fixed national holidays plus the Easter-anchored feasts.
    pub fn national() -> Self {
        let mut calendar = Self::fixed_only();
        calendar.definitions.extend([
            HolidayDefinition::easter("Carnival Monday", -48),
            HolidayDefinition::easter("Carnival Tuesday", -47),
            HolidayDefinition::easter("Good Friday", -2),
            HolidayDefinition::easter("Corpus Christi", 60),
        ]);
        calendar
    }

    /// Adds one-off dated holidays (regional or company days off).
    pub fn with_extra(mut self, extra: impl IntoIterator<Item = PublicHoliday>) -> Self {
        self.extra.extend(extra);
        self
    }

    /// All holidays observed in `year`, in date order.
    ///
    /// ```
    /// use timebank_engine::calculation::HolidayCalendar;
    ///
    /// let holidays = HolidayCalendar::national().holidays_for_year(2024);
    /// assert!(holidays.iter().any(|h| h.name == "Good Friday"
    ///     && h.date.to_string() == "2024-03-29"));
    /// ```
    pub fn holidays_for_year(&self, year: i32) -> Vec<PublicHoliday> {
        let mut holidays: Vec<PublicHoliday> = self
            .definitions
            .iter()
            .filter_map(|def| {
                def.date_in(year).map(|date| PublicHoliday {
                    date,
                    name: def.name.clone(),
                })
            })
            .chain(self.extra.iter().filter(|h| h.date.year() == year).cloned())
            .collect();
        holidays.sort_by(|a, b| a.date.cmp(&b.date));
        holidays
    }

    /// The holiday observed on `date`, if any.
    pub fn holiday_on(&self, date: NaiveDate) -> Option<PublicHoliday> {
        self.definitions
            .iter()
            .find(|def| def.date_in(date.year()) == Some(date))
            .map(|def| PublicHoliday {
                date,
                name: def.name.clone(),
            })
            .or_else(|| self.extra.iter().find(|h| h.date == date).cloned())
    }

    /// Returns true when `date` is a holiday.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holiday_on(date).is_some()
    }

    /// Holiday or weekend.
    pub fn is_special_day(&self, date: NaiveDate) -> bool {
        self.is_holiday(date) || is_weekend(date)
    }

    /// Classifies `date`; a holiday wins over the weekday.
    pub fn day_kind(&self, date: NaiveDate) -> DayKind {
        if self.is_holiday(date) {
            return DayKind::Holiday;
        }
        match date.weekday() {
            Weekday::Sat => DayKind::Saturday,
            Weekday::Sun => DayKind::Sunday,
            _ => DayKind::Workday,
        }
    }
}

/// Returns true on Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Holiday check against the national calendar.
///
/// ```
/// use timebank_engine::calculation::is_holiday;
/// use chrono::NaiveDate;
///
/// assert!(is_holiday(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()));
/// assert!(!is_holiday(NaiveDate::from_ymd_opt(2024, 12, 26).unwrap()));
/// ```
pub fn is_holiday(date: NaiveDate) -> bool {
    HolidayCalendar::national().is_holiday(date)
}

/// Easter Sunday in the Gregorian calendar (anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}
