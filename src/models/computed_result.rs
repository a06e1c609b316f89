//! Computed result models.
//!
//! This module contains the [`ComputedResult`] kept live per punch and the
//! audit trail recorded each time it is (re)computed: [`AuditStep`]s,
//! [`AuditWarning`]s and the [`ComputationLogEntry`] that wraps them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::{Lateness, OvertimeBreakdown, TimeBankBalance};

/// How the department caps affected a computation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapsApplied {
    /// The day's overtime was above the daily cap and got truncated.
    pub daily_exceeded: bool,
    /// The month's cumulative overtime is above the monthly cap.
    pub monthly_exceeded: bool,
    /// Daily cap in hours.
    pub daily_cap: Decimal,
    /// Monthly cap in hours.
    pub monthly_cap: Decimal,
    /// Month-to-date overtime including this punch.
    pub monthly_accumulated: Decimal,
    /// Department whose caps applied, if the employee has one.
    pub department: Option<String>,
}

/// The derived hours for one punch.
///
/// There is exactly one live result per punch; recomputation replaces it.
///
/// # Example
///
/// ```
/// use timebank_engine::models::{CapsApplied, ComputedResult};
/// use timebank_engine::calculation::{Lateness, OvertimeBreakdown, TimeBankBalance};
/// use chrono::{NaiveDate, Utc};
/// use rust_decimal::Decimal;
///
/// let result = ComputedResult {
///     punch_id: "punch_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     date: NaiveDate::from_ymd_opt(2026, 1, 14).unwrap(),
///     worked_hours: Decimal::new(8, 0),
///     contractual_hours: Decimal::new(8, 0),
///     overtime: OvertimeBreakdown::default(),
///     time_bank: TimeBankBalance::default(),
///     lateness: Lateness::default(),
///     is_holiday: false,
///     is_weekend: false,
///     computed_at: Utc::now(),
///     caps_applied: CapsApplied::default(),
/// };
/// assert!(!result.has_overtime());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedResult {
    /// The punch this result belongs to.
    pub punch_id: String,
    /// The punch's employee.
    pub employee_id: String,
    /// The punch's working day.
    pub date: NaiveDate,
    /// Hours worked, net of any break.
    pub worked_hours: Decimal,
    /// Contractual hours for the day.
    pub contractual_hours: Decimal,
    /// Overtime buckets after cap truncation.
    pub overtime: OvertimeBreakdown,
    /// Time-bank movement for the day.
    pub time_bank: TimeBankBalance,
    /// Lateness against the expected check-in.
    pub lateness: Lateness,
    /// The day is a holiday.
    pub is_holiday: bool,
    /// The day is a Saturday or Sunday.
    pub is_weekend: bool,
    /// When this result was computed.
    pub computed_at: DateTime<Utc>,
    /// Cap evaluation.
    pub caps_applied: CapsApplied,
}

impl ComputedResult {
    /// Returns true when any overtime was counted.
    pub fn has_overtime(&self) -> bool {
        self.overtime.total > Decimal::ZERO
    }

    /// Compares every field except `computed_at`.
    pub fn same_figures(&self, other: &ComputedResult) -> bool {
        ComputedResult {
            computed_at: other.computed_at,
            ..self.clone()
        } == *other
    }
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: severity.into(),
        }
    }
}

/// The complete audit trace for a computation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// One appended entry of the computation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationLogEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// The computed punch.
    pub punch_id: String,
    /// The punch's employee.
    pub employee_id: String,
    /// Matches the result's `computed_at`.
    pub computed_at: DateTime<Utc>,
    /// How the result was reached.
    pub trace: AuditTrace,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_result() -> ComputedResult {
        ComputedResult {
            punch_id: "punch_001".to_string(),
            employee_id: "emp_001".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 14).unwrap(),
            worked_hours: dec("10"),
            contractual_hours: dec("8"),
            overtime: OvertimeBreakdown {
                total: dec("2"),
                day: dec("2"),
                night: Decimal::ZERO,
                holiday: Decimal::ZERO,
            },
            time_bank: TimeBankBalance {
                positive: dec("2"),
                negative: Decimal::ZERO,
                balance: dec("2"),
            },
            lateness: Lateness::default(),
            is_holiday: false,
            is_weekend: false,
            computed_at: Utc::now(),
            caps_applied: CapsApplied {
                daily_cap: dec("2"),
                monthly_cap: dec("40"),
                monthly_accumulated: dec("2"),
                ..CapsApplied::default()
            },
        }
    }

    #[test]
    fn test_has_overtime() {
        assert!(sample_result().has_overtime());
    }

    #[test]
    fn test_same_figures_ignores_computed_at() {
        let first = sample_result();
        let mut second = first.clone();
        second.computed_at = first.computed_at + chrono::Duration::seconds(30);
        assert!(first.same_figures(&second));

        second.worked_hours = dec("9");
        assert!(!first.same_figures(&second));
    }

    #[test]
    fn test_result_serialization() {
        let json = serde_json::to_string(&sample_result()).unwrap();
        assert!(json.contains("\"punch_id\":\"punch_001\""));
        assert!(json.contains("\"date\":\"2026-01-14\""));
        assert!(json.contains("\"worked_hours\":\"10\""));
        assert!(json.contains("\"department\":null"));
    }

    #[test]
    fn test_audit_trace_default_is_empty() {
        let trace = AuditTrace::default();
        assert!(trace.steps.is_empty());
        assert!(trace.warnings.is_empty());
    }

    #[test]
    fn test_warning_constructor() {
        let warning = AuditWarning::new("DAILY_CAP_EXCEEDED", "capped", "medium");
        assert_eq!(warning.code, "DAILY_CAP_EXCEEDED");
        assert_eq!(warning.severity, "medium");
    }
}
