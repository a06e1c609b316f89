//! Overtime detection and day/night/holiday bucketing.
//!
//! Overtime is whatever a punch works beyond the contractual day. It is only
//! split into buckets here; premium percentages belong to payroll.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calendar::HolidayCalendar;
use super::time_arithmetic::{hhmm, hours_from_minutes, minutes_of_day};

/// Day or night shift period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftPeriod {
    /// Inside the day window.
    Day,
    /// Outside the day window.
    Night,
}

impl std::fmt::Display for ShiftPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShiftPeriod::Day => write!(f, "Day"),
            ShiftPeriod::Night => write!(f, "Night"),
        }
    }
}

/// The half-open `[start, end)` window counted as daytime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    /// First daytime minute.
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    /// First night minute after the day.
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl Default for DayWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
        }
    }
}

impl DayWindow {
    /// Classifies a wall-clock time.
    pub fn classify(&self, time: NaiveTime) -> ShiftPeriod {
        if time >= self.start && time < self.end {
            ShiftPeriod::Day
        } else {
            ShiftPeriod::Night
        }
    }
}

/// Classifies a time against the default 06:00-22:00 day window.
///
/// ```
/// use timebank_engine::calculation::{classify_period, ShiftPeriod};
/// use chrono::NaiveTime;
///
/// let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// assert_eq!(classify_period(t(6, 0)), ShiftPeriod::Day);
/// assert_eq!(classify_period(t(21, 59)), ShiftPeriod::Day);
/// assert_eq!(classify_period(t(22, 0)), ShiftPeriod::Night);
/// assert_eq!(classify_period(t(5, 59)), ShiftPeriod::Night);
/// ```
pub fn classify_period(time: NaiveTime) -> ShiftPeriod {
    DayWindow::default().classify(time)
}

/// Overtime hours split into buckets.
///
/// `day + night + holiday == total` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OvertimeBreakdown {
    /// All overtime hours.
    pub total: Decimal,
    /// Hours worked in the day window.
    pub day: Decimal,
    /// Hours worked outside the day window.
    pub night: Decimal,
    /// Hours worked on a holiday.
    pub holiday: Decimal,
}

impl OvertimeBreakdown {
    /// Sum of the three buckets.
    pub fn bucket_sum(&self) -> Decimal {
        self.day + self.night + self.holiday
    }

    /// Scales every bucket so the total becomes `cap`.
    ///
    /// Does nothing when the total is already within `cap`. The night bucket
    /// absorbs the rounding remainder so the sum stays exact.
    ///
    /// ```
    /// use timebank_engine::calculation::OvertimeBreakdown;
    /// use rust_decimal::Decimal;
    ///
    /// let overtime = OvertimeBreakdown {
    ///     total: Decimal::new(2, 0),
    ///     day: Decimal::new(15, 1),
    ///     night: Decimal::new(5, 1),
    ///     holiday: Decimal::ZERO,
    /// };
    /// let capped = overtime.rescale_to(Decimal::ONE);
    /// assert_eq!(capped.total, Decimal::ONE);
    /// assert_eq!(capped.day, Decimal::new(75, 2));
    /// assert_eq!(capped.night, Decimal::new(25, 2));
    /// ```
    pub fn rescale_to(&self, cap: Decimal) -> OvertimeBreakdown {
        if self.total <= cap || self.total <= Decimal::ZERO {
            return self.clone();
        }
        let cap = cap.max(Decimal::ZERO);
        let scale = |part: Decimal| {
            if part == self.total {
                cap
            } else {
                part * cap / self.total
            }
        };
        let day = scale(self.day);
        let holiday = scale(self.holiday);
        OvertimeBreakdown {
            total: cap,
            day,
            night: cap - day - holiday,
            holiday,
        }
    }
}

/// Splits the overtime of one punch into day, night and holiday hours.
///
/// 1. `overtime = worked - contractual`; nothing when not positive.
/// 2. On a holiday all of it is holiday overtime.
/// 3. When check-in and check-out fall in the same period it all goes there.
/// 4. Otherwise the day bucket takes what fits between the later of check-in
///    and the window start, and the window end; the rest is night.
///
/// # Example
///
/// ```
/// use timebank_engine::calculation::{compute_overtime, DayWindow, HolidayCalendar};
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
///
/// let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let date = NaiveDate::from_ymd_opt(2026, 1, 14).unwrap(); // Wednesday
/// let overtime = compute_overtime(
///     t(14, 0),
///     t(23, 0),
///     Decimal::new(9, 0),
///     Decimal::new(6, 0),
///     date,
///     &HolidayCalendar::national(),
///     &DayWindow::default(),
/// );
/// assert_eq!(overtime.total, Decimal::new(3, 0));
/// assert_eq!(overtime.day, Decimal::new(3, 0));
/// assert_eq!(overtime.night, Decimal::ZERO);
/// ```
pub fn compute_overtime(
    check_in: NaiveTime,
    check_out: NaiveTime,
    worked_hours: Decimal,
    contractual_hours: Decimal,
    date: NaiveDate,
    calendar: &HolidayCalendar,
    window: &DayWindow,
) -> OvertimeBreakdown {
    let overtime = worked_hours - contractual_hours;
    if overtime <= Decimal::ZERO {
        return OvertimeBreakdown::default();
    }

    if calendar.is_holiday(date) {
        return OvertimeBreakdown {
            total: overtime,
            holiday: overtime,
            ..OvertimeBreakdown::default()
        };
    }

    let start_period = window.classify(check_in);
    if start_period == window.classify(check_out) {
        return match start_period {
            ShiftPeriod::Day => OvertimeBreakdown {
                total: overtime,
                day: overtime,
                ..OvertimeBreakdown::default()
            },
            ShiftPeriod::Night => OvertimeBreakdown {
                total: overtime,
                night: overtime,
                ..OvertimeBreakdown::default()
            },
        };
    }

    let day_start = minutes_of_day(window.start);
    let day_end = minutes_of_day(window.end);
    let day_room = hours_from_minutes(day_end - minutes_of_day(check_in).max(day_start));
    let day = overtime.min(day_room.max(Decimal::ZERO));

    OvertimeBreakdown {
        total: overtime,
        day,
        night: overtime - day,
        holiday: Decimal::ZERO,
    }
}
