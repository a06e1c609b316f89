//! Configuration types for the time-bank engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every field has a
//! default, so a partial file only overrides what it mentions.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::calculation::{
    DEFAULT_LATENESS_TOLERANCE_MINUTES, DayWindow, HolidayCalendar, PublicHoliday, hhmm,
};
use crate::models::{CapLimits, DEFAULT_CONTRACTUAL_DAILY_HOURS, EmployeeProfile};

/// Default longest shift accepted when check-out wraps past midnight.
pub const DEFAULT_MAX_SHIFT_HOURS: Decimal = Decimal::from_parts(16, 0, 0, false, 0);

/// Working terms assumed for employees the directory does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDefaults {
    /// Contractual hours per day.
    pub contractual_daily_hours: Decimal,
    /// Expected check-in.
    #[serde(with = "hhmm")]
    pub expected_check_in: NaiveTime,
    /// Expected check-out.
    #[serde(with = "hhmm")]
    pub expected_check_out: NaiveTime,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        let fallback = EmployeeProfile::fallback("");
        Self {
            contractual_daily_hours: DEFAULT_CONTRACTUAL_DAILY_HOURS,
            expected_check_in: fallback.expected_check_in,
            expected_check_out: fallback.expected_check_out,
        }
    }
}

impl ProfileDefaults {
    /// Builds a department-less profile for `employee_id`.
    pub fn profile_for(&self, employee_id: &str) -> EmployeeProfile {
        EmployeeProfile {
            employee_id: employee_id.to_string(),
            name: None,
            contractual_daily_hours: self.contractual_daily_hours,
            expected_check_in: self.expected_check_in,
            expected_check_out: self.expected_check_out,
            department: None,
        }
    }
}

/// Rate limiting of recompute notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Quiet period after the last recomputation before a notice is released.
    pub debounce_ms: u64,
    /// Minimum gap between two released notices.
    pub min_interval_ms: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            min_interval_ms: 2_000,
        }
    }
}

impl NotificationSettings {
    /// Debounce as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Minimum interval as a [`Duration`].
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

/// Batch recomputation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// The async batch yields to the runtime after this many punches.
    pub yield_every: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self { yield_every: 25 }
    }
}

/// Holiday calendar settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolidaySettings {
    /// Include Carnival, Good Friday and Corpus Christi.
    pub include_movable_feasts: bool,
    /// Additional dated holidays (regional or company days off).
    pub extra: Vec<PublicHoliday>,
}

impl Default for HolidaySettings {
    fn default() -> Self {
        Self {
            include_movable_feasts: true,
            extra: Vec::new(),
        }
    }
}

impl HolidaySettings {
    /// Builds the holiday calendar these settings describe.
    pub fn calendar(&self) -> HolidayCalendar {
        let base = if self.include_movable_feasts {
            HolidayCalendar::national()
        } else {
            HolidayCalendar::fixed_only()
        };
        base.with_extra(self.extra.iter().cloned())
    }
}

/// Engine configuration, as loaded from `engine.yaml`.
///
/// # Example
///
/// ```
/// use timebank_engine::config::EngineConfig;
///
/// let config: EngineConfig = serde_yaml::from_str("lateness_tolerance_minutes: 10").unwrap();
/// assert_eq!(config.lateness_tolerance_minutes, 10);
/// assert_eq!(config.batch.yield_every, 25);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minutes of grace before a check-in counts as late.
    pub lateness_tolerance_minutes: i64,
    /// Daytime window for overtime bucketing.
    pub day_window: DayWindow,
    /// Terms for employees the directory does not resolve.
    pub default_profile: ProfileDefaults,
    /// Caps for departments without their own.
    pub default_caps: CapLimits,
    /// Longest accepted shift when check-out wraps past midnight.
    pub max_shift_hours: Decimal,
    /// Recompute notice rate limiting.
    pub notifications: NotificationSettings,
    /// Batch recomputation.
    pub batch: BatchSettings,
    /// Holiday calendar.
    pub holidays: HolidaySettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lateness_tolerance_minutes: DEFAULT_LATENESS_TOLERANCE_MINUTES,
            day_window: DayWindow::default(),
            default_profile: ProfileDefaults::default(),
            default_caps: CapLimits::default(),
            max_shift_hours: DEFAULT_MAX_SHIFT_HOURS,
            notifications: NotificationSettings::default(),
            batch: BatchSettings::default(),
            holidays: HolidaySettings::default(),
        }
    }
}

/// Employee directory file structure (`employees.yaml`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeesConfig {
    /// Known employee profiles.
    #[serde(default)]
    pub employees: Vec<EmployeeProfile>,
}
