//! Wall-clock arithmetic for punches.
//!
//! Punches carry bare `HH:mm` times with no date attached, so every duration
//! here follows the midnight-wrap rule: an end time earlier than its start
//! time is read as belonging to the following day.

use chrono::{NaiveTime, Timelike};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{EngineError, EngineResult};

/// Minutes in a full day.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// Parses a strict `HH:mm` wall-clock time (00:00 through 23:59).
///
/// # Example
///
/// ```
/// use timebank_engine::calculation::parse_hhmm;
///
/// assert!(parse_hhmm("08:30", "check_in").is_ok());
/// assert!(parse_hhmm("24:00", "check_in").is_err());
/// assert!(parse_hhmm("8:30", "check_in").is_err());
/// assert!(parse_hhmm("08:30:00", "check_in").is_err());
/// ```
pub fn parse_hhmm(value: &str, field: &str) -> EngineResult<NaiveTime> {
    let bytes = value.as_bytes();
    let well_shaped = bytes.len() == 5
        && bytes[2] == b':'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || b.is_ascii_digit());
    if !well_shaped {
        return Err(EngineError::validation(
            field,
            format!("expected HH:mm, got '{}'", value),
        ));
    }

    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| {
        EngineError::validation(field, format!("'{}' is not a time between 00:00 and 23:59", value))
    })
}

/// Minutes elapsed since midnight.
pub fn minutes_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// Minutes from `start` to `end`, wrapping past midnight when `end < start`.
///
/// # Example
///
/// ```
/// use timebank_engine::calculation::minutes_between;
/// use chrono::NaiveTime;
///
/// let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// assert_eq!(minutes_between(t(8, 0), t(17, 30)), 570);
/// assert_eq!(minutes_between(t(22, 0), t(6, 0)), 480);
/// assert_eq!(minutes_between(t(9, 0), t(9, 0)), 0);
/// ```
pub fn minutes_between(start: NaiveTime, end: NaiveTime) -> i64 {
    let diff = minutes_of_day(end) - minutes_of_day(start);
    if diff < 0 { diff + MINUTES_PER_DAY } else { diff }
}

/// Converts a minute count to decimal hours.
pub fn hours_from_minutes(minutes: i64) -> Decimal {
    Decimal::new(minutes, 0) / MINUTES_PER_HOUR
}

/// Hours worked between check-in and check-out.
///
/// The break is deducted only when both bounds are supplied; there is no
/// implicit lunch deduction. The result never goes below zero.
///
/// # Example
///
/// ```
/// use timebank_engine::calculation::worked_hours;
/// use chrono::NaiveTime;
/// use rust_decimal::Decimal;
///
/// let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// assert_eq!(worked_hours(t(8, 0), t(18, 0), None, None), Decimal::new(10, 0));
/// assert_eq!(
///     worked_hours(t(8, 0), t(17, 0), Some(t(12, 0)), Some(t(13, 0))),
///     Decimal::new(8, 0)
/// );
/// ```
pub fn worked_hours(
    check_in: NaiveTime,
    check_out: NaiveTime,
    break_start: Option<NaiveTime>,
    break_end: Option<NaiveTime>,
) -> Decimal {
    let total = hours_from_minutes(minutes_between(check_in, check_out));
    match (break_start, break_end) {
        (Some(start), Some(end)) => {
            let pause = hours_from_minutes(minutes_between(start, end));
            (total - pause).max(Decimal::ZERO)
        }
        _ => total,
    }
}

/// Formats a signed minute count as `HH:MM`, prefixing `-` when negative.
pub fn format_minutes(minutes: i64) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let m = minutes.abs();
    format!("{}{:02}:{:02}", sign, m / 60, m % 60)
}

/// Formats decimal hours as `HH:MM`, rounded to the nearest minute.
///
/// ```
/// use timebank_engine::calculation::format_hours;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_hours(Decimal::new(25, 1)), "02:30");
/// assert_eq!(format_hours(Decimal::new(-125, 2)), "-01:15");
/// ```
pub fn format_hours(hours: Decimal) -> String {
    let minutes = (hours * MINUTES_PER_HOUR).round().to_i64().unwrap_or(0);
    format_minutes(minutes)
}

/// Serde adapter for `HH:mm` time fields in configuration files.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes a time as `HH:mm`.
    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    /// Deserializes a strict `HH:mm` time.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_hhmm(&raw, "time").map_err(serde::de::Error::custom)
    }
}
