//! Employee profile as resolved through the directory.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::hhmm;

/// Default contractual hours per day.
pub const DEFAULT_CONTRACTUAL_DAILY_HOURS: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Working terms of an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    /// Unique identifier for the employee.
    pub employee_id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Contractual hours per day.
    pub contractual_daily_hours: Decimal,
    /// Expected check-in.
    #[serde(with = "hhmm")]
    pub expected_check_in: NaiveTime,
    /// Expected check-out.
    #[serde(with = "hhmm")]
    pub expected_check_out: NaiveTime,
    /// Department used for overtime caps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl EmployeeProfile {
    /// The 8h, 08:00-17:00 profile used when the directory has no entry.
    ///
    /// ```
    /// use timebank_engine::models::EmployeeProfile;
    /// use rust_decimal::Decimal;
    ///
    /// let profile = EmployeeProfile::fallback("emp_404");
    /// assert_eq!(profile.contractual_daily_hours, Decimal::new(8, 0));
    /// assert!(profile.department.is_none());
    /// ```
    pub fn fallback(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            name: None,
            contractual_daily_hours: DEFAULT_CONTRACTUAL_DAILY_HOURS,
            expected_check_in: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            expected_check_out: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            department: None,
        }
    }
}
