//! Tolerance-based lateness check.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::time_arithmetic::minutes_of_day;

/// Default grace period before a check-in counts as late.
pub const DEFAULT_LATENESS_TOLERANCE_MINUTES: i64 = 5;

/// Outcome of a lateness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lateness {
    /// True when the delay exceeds the tolerance.
    pub is_late: bool,
    /// Minutes past the expected check-in (zero when early or on time).
    pub minutes: i64,
}

/// Compares the actual check-in to the expected one.
///
/// `minutes` reports the full delay even when it stays within tolerance.
///
/// # Example
///
/// ```
/// use timebank_engine::calculation::verify_lateness;
/// use chrono::NaiveTime;
///
/// let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let on_grace = verify_lateness(t(8, 0), t(8, 5), 5);
/// assert!(!on_grace.is_late);
/// assert_eq!(on_grace.minutes, 5);
///
/// let late = verify_lateness(t(8, 0), t(8, 6), 5);
/// assert!(late.is_late);
/// ```
pub fn verify_lateness(expected: NaiveTime, actual: NaiveTime, tolerance_minutes: i64) -> Lateness {
    let diff = minutes_of_day(actual) - minutes_of_day(expected);
    Lateness {
        is_late: diff > tolerance_minutes,
        minutes: diff.max(0),
    }
}
