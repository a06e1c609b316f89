//! Punch model.
//!
//! A punch is one day's recorded check-in/check-out pair. Times are kept in
//! their recorded `HH:mm` form and validated when the punch is computed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Whether a punch still carries its recorded times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunchStatus {
    /// Times as originally recorded.
    #[default]
    Original,
    /// At least one correction was applied. Never reverts to `Original`.
    Corrected,
}

/// One day's check-in/check-out for an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchRecord {
    /// Unique identifier for the punch.
    pub id: String,
    /// The employee who punched.
    pub employee_id: String,
    /// The working day the punch belongs to.
    pub date: NaiveDate,
    /// Check-in as `HH:mm`.
    pub check_in: String,
    /// Check-out as `HH:mm`; earlier than check-in means the shift crossed midnight.
    pub check_out: String,
    /// Break start as `HH:mm`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_start: Option<String>,
    /// Break end as `HH:mm`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_end: Option<String>,
    /// Correction status.
    #[serde(default)]
    pub status: PunchStatus,
    /// Who applied the latest correction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_by: Option<String>,
    /// When the punch last changed.
    #[serde(default = "chrono::Utc::now")]
    pub last_modified: DateTime<Utc>,
}

impl PunchRecord {
    /// Creates an uncorrected punch without a break.
    ///
    /// ```
    /// use timebank_engine::models::{PunchRecord, PunchStatus};
    /// use chrono::NaiveDate;
    ///
    /// let punch = PunchRecord::new(
    ///     "punch_001",
    ///     "emp_001",
    ///     NaiveDate::from_ymd_opt(2026, 1, 14).unwrap(),
    ///     "08:00",
    ///     "17:00",
    /// );
    /// assert_eq!(punch.status, PunchStatus::Original);
    /// assert!(punch.break_start.is_none());
    /// ```
    pub fn new(
        id: impl Into<String>,
        employee_id: impl Into<String>,
        date: NaiveDate,
        check_in: impl Into<String>,
        check_out: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            employee_id: employee_id.into(),
            date,
            check_in: check_in.into(),
            check_out: check_out.into(),
            break_start: None,
            break_end: None,
            status: PunchStatus::Original,
            corrected_by: None,
            last_modified: Utc::now(),
        }
    }

    /// Sets the break bounds.
    pub fn with_break(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.break_start = Some(start.into());
        self.break_end = Some(end.into());
        self
    }

    /// Returns true once a correction has been applied.
    pub fn is_corrected(&self) -> bool {
        self.status == PunchStatus::Corrected
    }
}
