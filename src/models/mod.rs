//! Core data models for the time-bank engine.
//!
//! This module contains all the domain records the engine reads and persists.

mod computed_result;
mod correction;
mod department_cap;
mod employee;
mod punch;

pub use computed_result::{
    AuditStep, AuditTrace, AuditWarning, CapsApplied, ComputationLogEntry, ComputedResult,
};
pub use correction::{CorrectionEntry, MIN_REASON_CHARS, PunchCorrection};
pub use department_cap::{
    CapChangeAction, CapChangeLogEntry, CapLimits, DEFAULT_DAILY_CAP_HOURS,
    DEFAULT_MONTHLY_CAP_HOURS, DepartmentCap,
};
pub use employee::{DEFAULT_CONTRACTUAL_DAILY_HOURS, EmployeeProfile};
pub use punch::{PunchRecord, PunchStatus};
