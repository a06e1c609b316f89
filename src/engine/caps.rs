//! Department overtime caps.
//!
//! Each department may configure how much overtime counts per day and per
//! calendar month; unconfigured departments (and employees without one) use
//! the engine defaults. The daily cap truncates the day's overtime. The
//! monthly cap only flags: it is evaluated on the month-to-date figure and
//! reported, never applied retroactively.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, CapChangeAction, CapChangeLogEntry, CapLimits, ComputedResult, DepartmentCap,
};
use crate::store::{Collection, Repository};

/// Warning code recorded when the daily cap truncated overtime.
pub const DAILY_CAP_EXCEEDED: &str = "DAILY_CAP_EXCEEDED";

/// Warning code recorded when month-to-date overtime passed the monthly cap.
pub const MONTHLY_CAP_EXCEEDED: &str = "MONTHLY_CAP_EXCEEDED";

/// Outcome of checking one day's overtime against the daily cap.
///
/// # Example
///
/// ```
/// use timebank_engine::engine::DailyCapCheck;
/// use rust_decimal::Decimal;
///
/// let check = DailyCapCheck::evaluate(Decimal::new(3, 0), Decimal::new(2, 0));
/// assert!(check.exceeded);
/// assert_eq!(check.truncated, Decimal::new(2, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCapCheck {
    /// The overtime was above the cap.
    pub exceeded: bool,
    /// The cap applied.
    pub cap: Decimal,
    /// Overtime that counts: `min(overtime, cap)`.
    pub truncated: Decimal,
}

impl DailyCapCheck {
    /// Checks `overtime_today` against `cap`.
    pub fn evaluate(overtime_today: Decimal, cap: Decimal) -> Self {
        Self {
            exceeded: overtime_today > cap,
            cap,
            truncated: overtime_today.min(cap),
        }
    }

    /// Records the check as an audit step.
    pub fn audit_step(&self, overtime_today: Decimal, step_number: u32) -> AuditStep {
        let reasoning = if self.exceeded {
            format!(
                "{} overtime hours exceed the {} hour daily cap; {} hours count",
                overtime_today, self.cap, self.truncated
            )
        } else {
            format!(
                "{} overtime hours are within the {} hour daily cap",
                overtime_today, self.cap
            )
        };
        AuditStep {
            step_number,
            rule_id: "daily_overtime_cap".to_string(),
            rule_name: "Daily Overtime Cap".to_string(),
            input: serde_json::json!({
                "overtime_hours": overtime_today.to_string(),
                "daily_cap": self.cap.to_string(),
            }),
            output: serde_json::json!({
                "exceeded": self.exceeded,
                "counted_hours": self.truncated.to_string(),
            }),
            reasoning,
        }
    }
}

/// Outcome of checking month-to-date overtime against the monthly cap.
///
/// # Example
///
/// ```
/// use timebank_engine::engine::MonthlyCapCheck;
/// use rust_decimal::Decimal;
///
/// let check = MonthlyCapCheck::evaluate(Decimal::new(38, 0), Decimal::new(40, 0));
/// assert!(!check.exceeded);
/// assert_eq!(check.available, Decimal::new(2, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCapCheck {
    /// The cumulative figure is above the cap.
    pub exceeded: bool,
    /// The cap applied.
    pub cap: Decimal,
    /// Hours left before the cap: `max(0, cap - cumulative)`.
    pub available: Decimal,
}

impl MonthlyCapCheck {
    /// Checks `cumulative` month-to-date overtime against `cap`.
    pub fn evaluate(cumulative: Decimal, cap: Decimal) -> Self {
        Self {
            exceeded: cumulative > cap,
            cap,
            available: (cap - cumulative).max(Decimal::ZERO),
        }
    }

    /// Records the check as an audit step.
    pub fn audit_step(&self, cumulative: Decimal, step_number: u32) -> AuditStep {
        let reasoning = if self.exceeded {
            format!(
                "{} month-to-date overtime hours exceed the {} hour monthly cap",
                cumulative, self.cap
            )
        } else {
            format!(
                "{} month-to-date overtime hours leave {} of the {} hour monthly cap",
                cumulative, self.available, self.cap
            )
        };
        AuditStep {
            step_number,
            rule_id: "monthly_overtime_cap".to_string(),
            rule_name: "Monthly Overtime Cap".to_string(),
            input: serde_json::json!({
                "monthly_accumulated": cumulative.to_string(),
                "monthly_cap": self.cap.to_string(),
            }),
            output: serde_json::json!({
                "exceeded": self.exceeded,
                "available_hours": self.available.to_string(),
            }),
            reasoning,
        }
    }
}

/// Reads and maintains department caps and evaluates overtime against them.
#[derive(Debug)]
pub struct OvertimeCapEnforcer {
    repository: Arc<Repository>,
    defaults: CapLimits,
}

impl OvertimeCapEnforcer {
    /// Creates an enforcer over `repository`, using `defaults` for
    /// unconfigured departments.
    pub fn new(repository: Arc<Repository>, defaults: CapLimits) -> Self {
        Self {
            repository,
            defaults,
        }
    }

    /// The caps used when a department has none.
    pub fn defaults(&self) -> CapLimits {
        self.defaults
    }

    /// The caps in force for `department`; defaults when unconfigured or `None`.
    pub fn get_cap(&self, department: Option<&str>) -> EngineResult<CapLimits> {
        let Some(department) = department else {
            return Ok(self.defaults);
        };
        let caps: Vec<DepartmentCap> = self.repository.load(Collection::DepartmentCaps)?;
        Ok(caps
            .iter()
            .find(|cap| cap.department == department)
            .map(DepartmentCap::limits)
            .unwrap_or(self.defaults))
    }

    /// Every configured department cap.
    pub fn list_caps(&self) -> EngineResult<Vec<DepartmentCap>> {
        self.repository.load(Collection::DepartmentCaps)
    }

    /// Creates or replaces a department's caps and logs the change.
    pub fn set_cap(
        &self,
        department: &str,
        limits: CapLimits,
        actor: &str,
    ) -> EngineResult<DepartmentCap> {
        if department.trim().is_empty() {
            return Err(EngineError::validation("department", "must not be empty"));
        }
        if limits.daily_cap.is_sign_negative() {
            return Err(EngineError::validation("daily_cap", "must not be negative"));
        }
        if limits.monthly_cap.is_sign_negative() {
            return Err(EngineError::validation("monthly_cap", "must not be negative"));
        }

        let now = Utc::now();
        let cap = DepartmentCap {
            department: department.to_string(),
            daily_cap: limits.daily_cap,
            monthly_cap: limits.monthly_cap,
            updated_by: actor.to_string(),
            updated_at: now,
        };

        let previous = self.repository.update(
            Collection::DepartmentCaps,
            |caps: &mut Vec<DepartmentCap>| {
                let previous = match caps.iter_mut().find(|c| c.department == department) {
                    Some(existing) => {
                        let previous = existing.limits();
                        *existing = cap.clone();
                        Some(previous)
                    }
                    None => {
                        caps.push(cap.clone());
                        None
                    }
                };
                Ok(previous)
            },
        )?;

        let action = if previous.is_some() {
            CapChangeAction::Updated
        } else {
            CapChangeAction::Created
        };
        self.log_change(department, action, previous, Some(limits), actor)?;

        info!(
            department = %department,
            daily_cap = %limits.daily_cap,
            monthly_cap = %limits.monthly_cap,
            actor = %actor,
            "Department cap saved"
        );
        Ok(cap)
    }

    /// Deletes a department's caps so the defaults apply again.
    ///
    /// Returns the removed limits, or `None` when nothing was configured (in
    /// which case no change is logged).
    pub fn remove_cap(&self, department: &str, actor: &str) -> EngineResult<Option<CapLimits>> {
        let removed = self.repository.update(
            Collection::DepartmentCaps,
            |caps: &mut Vec<DepartmentCap>| {
                let position = caps.iter().position(|c| c.department == department);
                Ok(position.map(|index| caps.remove(index).limits()))
            },
        )?;

        if let Some(previous) = removed {
            self.log_change(
                department,
                CapChangeAction::Removed,
                Some(previous),
                None,
                actor,
            )?;
            info!(department = %department, actor = %actor, "Department cap removed");
        }
        Ok(removed)
    }

    /// Cap change history, oldest first, optionally for one department.
    pub fn change_log(&self, department: Option<&str>) -> EngineResult<Vec<CapChangeLogEntry>> {
        let entries: Vec<CapChangeLogEntry> = self.repository.load(Collection::CapChangeLog)?;
        Ok(match department {
            Some(department) => entries
                .into_iter()
                .filter(|entry| entry.department == department)
                .collect(),
            None => entries,
        })
    }

    /// Checks one day's overtime against the department's daily cap.
    pub fn check_daily(
        &self,
        department: Option<&str>,
        overtime_today: Decimal,
    ) -> EngineResult<DailyCapCheck> {
        let limits = self.get_cap(department)?;
        Ok(DailyCapCheck::evaluate(overtime_today, limits.daily_cap))
    }

    /// Checks month-to-date overtime against the department's monthly cap.
    pub fn check_monthly(
        &self,
        department: Option<&str>,
        cumulative: Decimal,
    ) -> EngineResult<MonthlyCapCheck> {
        let limits = self.get_cap(department)?;
        Ok(MonthlyCapCheck::evaluate(cumulative, limits.monthly_cap))
    }

    /// Overtime already counted for the employee in the given calendar month.
    ///
    /// Sums the live result of each punch, so recomputed punches are counted
    /// once.
    pub fn monthly_accumulated(
        &self,
        employee_id: &str,
        month: u32,
        year: i32,
    ) -> EngineResult<Decimal> {
        self.monthly_accumulated_excluding(employee_id, month, year, None)
    }

    /// Like [`monthly_accumulated`](Self::monthly_accumulated), leaving out
    /// one punch's own result.
    pub fn monthly_accumulated_excluding(
        &self,
        employee_id: &str,
        month: u32,
        year: i32,
        excluded_punch: Option<&str>,
    ) -> EngineResult<Decimal> {
        let results: Vec<ComputedResult> = self.repository.load(Collection::ComputedResults)?;
        Ok(results
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .filter(|r| in_month(r.date, month, year))
            .filter(|r| excluded_punch != Some(r.punch_id.as_str()))
            .map(|r| r.overtime.total)
            .sum())
    }

    fn log_change(
        &self,
        department: &str,
        action: CapChangeAction,
        previous: Option<CapLimits>,
        current: Option<CapLimits>,
        actor: &str,
    ) -> EngineResult<()> {
        self.repository.append(
            Collection::CapChangeLog,
            CapChangeLogEntry {
                id: Uuid::new_v4(),
                department: department.to_string(),
                action,
                previous,
                current,
                actor: actor.to_string(),
                changed_at: Utc::now(),
            },
        )
    }
}

fn in_month(date: NaiveDate, month: u32, year: i32) -> bool {
    date.month() == month && date.year() == year
}
