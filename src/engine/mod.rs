//! Stateful engine services.
//!
//! The calculation rules in [`crate::calculation`] are pure; this module
//! wires them to persistence, the employee directory, department caps, the
//! correction ledger and the recompute notifier.

mod caps;
mod directory;
mod hours;
mod ledger;
mod notifier;

pub use caps::{
    DAILY_CAP_EXCEEDED, DailyCapCheck, MONTHLY_CAP_EXCEEDED, MonthlyCapCheck,
    OvertimeCapEnforcer,
};
pub use directory::{EmployeeDirectory, StaticDirectory};
pub use hours::{
    Computation, HoursEngine, INCOMPLETE_BREAK, PERSISTENCE_FAILED, PROFILE_NOT_FOUND,
    RecalcFailure, RecalcSummary,
};
pub use ledger::{CorrectionLedger, CorrectionOutcome, project, validate_shift_span};
pub use notifier::{
    BroadcastSink, EventSink, RECOMPUTED_TOPIC, RecomputeEvent, RecomputeNotice,
    RecomputeNotifier, TracingSink,
};
