//! Pure calculation rules for punch hours.
//!
//! This module contains the side-effect free building blocks of the engine:
//! wall-clock arithmetic with midnight wrap, the holiday calendar, overtime
//! bucketing across the day/night boundary, tolerance-based lateness and the
//! time-bank balance.

mod calendar;
mod lateness;
mod overtime;
mod time_arithmetic;
mod time_bank;

pub use calendar::{
    DayKind, HolidayCalendar, HolidayDefinition, HolidayRule, PublicHoliday, easter_sunday,
    is_holiday, is_weekend,
};
pub use lateness::{DEFAULT_LATENESS_TOLERANCE_MINUTES, Lateness, verify_lateness};
pub use overtime::{
    DayWindow, OvertimeBreakdown, ShiftPeriod, classify_period, compute_overtime,
};
pub use time_arithmetic::{
    MINUTES_PER_DAY, format_hours, format_minutes, hhmm, hours_from_minutes, minutes_between,
    minutes_of_day, parse_hhmm, worked_hours,
};
pub use time_bank::{TimeBankBalance, compute_time_bank};
