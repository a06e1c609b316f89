//! Correction ledger.
//!
//! Punch edits are appended as immutable [`CorrectionEntry`] rows. The
//! ledger is authoritative: a punch's current times are the fold of its
//! entries over the recorded punch ([`project`]), and the stored punch row
//! is only a convenience copy of that fold.

use std::sync::Arc;

use chrono::{NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{hours_from_minutes, minutes_between, parse_hhmm};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ComputedResult, CorrectionEntry, MIN_REASON_CHARS, PunchCorrection, PunchRecord, PunchStatus,
};
use crate::store::Collection;

use super::hours::HoursEngine;

/// The outcome of a successful correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionOutcome {
    /// The punch after the correction.
    pub punch: PunchRecord,
    /// The appended ledger entry.
    pub entry: CorrectionEntry,
    /// The recomputed result, when recomputation succeeded.
    pub recomputed: Option<ComputedResult>,
    /// Why recomputation failed or was not saved, if it did.
    pub recompute_warning: Option<String>,
}

/// Rejects a check-out that wraps past midnight into an overlong shift.
///
/// A check-out earlier than the check-in is read as the next day. Equal
/// times are a zero-length shift.
///
/// ```
/// use timebank_engine::engine::validate_shift_span;
/// use chrono::NaiveTime;
/// use rust_decimal::Decimal;
///
/// let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let max = Decimal::new(16, 0);
/// assert!(validate_shift_span(t(22, 0), t(6, 0), max).is_ok());
/// assert!(validate_shift_span(t(9, 0), t(8, 0), max).is_err());
/// ```
pub fn validate_shift_span(
    check_in: NaiveTime,
    check_out: NaiveTime,
    max_shift_hours: Decimal,
) -> EngineResult<()> {
    if check_out >= check_in {
        return Ok(());
    }
    let span = hours_from_minutes(minutes_between(check_in, check_out));
    if span > max_shift_hours {
        return Err(EngineError::validation(
            "check_out",
            format!(
                "check-out before check-in wraps to a {} hour shift, longer than {} hours",
                span.normalize(),
                max_shift_hours
            ),
        ));
    }
    Ok(())
}

/// Rebuilds a punch's current state from its ledger entries.
///
/// Entries belonging to other punches are ignored. Without entries the
/// stored punch is returned unchanged; otherwise the times start from the
/// first entry's originals and every entry is applied in ledger order.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, Utc};
/// use timebank_engine::engine::project;
/// use timebank_engine::models::{CorrectionEntry, PunchRecord, PunchStatus};
/// use uuid::Uuid;
///
/// let date = NaiveDate::from_ymd_opt(2026, 1, 14).unwrap();
/// let stored = PunchRecord::new("p1", "emp_001", date, "08:00", "17:00");
/// let entry = CorrectionEntry {
///     id: Uuid::new_v4(),
///     punch_id: "p1".to_string(),
///     employee_id: "emp_001".to_string(),
///     date,
///     original_check_in: "08:00".to_string(),
///     new_check_in: "08:00".to_string(),
///     original_check_out: "17:00".to_string(),
///     new_check_out: "18:00".to_string(),
///     reason: "Forgot to clock out".to_string(),
///     corrected_by: "supervisor_01".to_string(),
///     corrected_at: Utc::now(),
/// };
///
/// let current = project(&stored, &[entry]);
/// assert_eq!(current.check_out, "18:00");
/// assert_eq!(current.status, PunchStatus::Corrected);
/// ```
pub fn project(stored: &PunchRecord, entries: &[CorrectionEntry]) -> PunchRecord {
    let mut own = entries.iter().filter(|e| e.punch_id == stored.id).peekable();
    let Some(first) = own.peek() else {
        return stored.clone();
    };

    let mut punch = PunchRecord {
        check_in: first.original_check_in.clone(),
        check_out: first.original_check_out.clone(),
        status: PunchStatus::Original,
        corrected_by: None,
        ..stored.clone()
    };
    for entry in own {
        apply(&mut punch, entry);
    }
    punch
}

fn apply(punch: &mut PunchRecord, entry: &CorrectionEntry) {
    punch.check_in = entry.new_check_in.clone();
    punch.check_out = entry.new_check_out.clone();
    punch.status = PunchStatus::Corrected;
    punch.corrected_by = Some(entry.corrected_by.clone());
    punch.last_modified = entry.corrected_at;
}

/// Appends punch corrections and triggers recomputation.
#[derive(Debug, Clone)]
pub struct CorrectionLedger {
    engine: Arc<HoursEngine>,
}

impl CorrectionLedger {
    /// Creates a ledger recomputing through `engine`.
    pub fn new(engine: Arc<HoursEngine>) -> Self {
        Self { engine }
    }

    /// Corrects a punch's times.
    ///
    /// Fails with [`EngineError::Validation`] when the reason is shorter
    /// than ten characters, when neither time changes, or when the new pair
    /// is malformed or wraps into an overlong shift; nothing is appended
    /// then. An unknown punch is [`EngineError::PunchNotFound`].
    ///
    /// After the entry is appended the correction stands: a failed
    /// recomputation is reported in the outcome and nothing is rolled back.
    pub fn correct_punch(
        &self,
        punch_id: &str,
        correction: &PunchCorrection,
        actor: &str,
    ) -> EngineResult<CorrectionOutcome> {
        let reason = correction.reason.trim();
        if reason.chars().count() < MIN_REASON_CHARS {
            return Err(EngineError::validation(
                "reason",
                format!("must be at least {} characters", MIN_REASON_CHARS),
            ));
        }
        if actor.trim().is_empty() {
            return Err(EngineError::validation("corrected_by", "must not be empty"));
        }

        let current = self.engine.current_punch(punch_id)?;
        let new_check_in = correction
            .new_check_in
            .clone()
            .unwrap_or_else(|| current.check_in.clone());
        let new_check_out = correction
            .new_check_out
            .clone()
            .unwrap_or_else(|| current.check_out.clone());

        let check_in = parse_hhmm(&new_check_in, "new_check_in")?;
        let check_out = parse_hhmm(&new_check_out, "new_check_out")?;
        if new_check_in == current.check_in && new_check_out == current.check_out {
            return Err(EngineError::validation(
                "correction",
                "neither check-in nor check-out differs from the current punch",
            ));
        }
        validate_shift_span(check_in, check_out, self.engine.config().max_shift_hours)?;

        let entry = CorrectionEntry {
            id: Uuid::new_v4(),
            punch_id: current.id.clone(),
            employee_id: current.employee_id.clone(),
            date: current.date,
            original_check_in: current.check_in.clone(),
            new_check_in,
            original_check_out: current.check_out.clone(),
            new_check_out,
            reason: reason.to_string(),
            corrected_by: actor.to_string(),
            corrected_at: Utc::now(),
        };
        let repository = self.engine.repository();
        repository.append(Collection::CorrectionLedger, entry.clone())?;

        let mut punch = current;
        apply(&mut punch, &entry);
        let stored_copy = punch.clone();
        if let Err(err) = repository.update(Collection::Punches, |rows: &mut Vec<PunchRecord>| {
            match rows.iter_mut().find(|p| p.id == stored_copy.id) {
                Some(row) => *row = stored_copy,
                None => rows.push(stored_copy),
            }
            Ok(())
        }) {
            warn!(punch_id = %punch.id, error = %err, "Corrected punch row not saved");
        }

        info!(
            punch_id = %punch.id,
            entry_id = %entry.id,
            corrected_by = %actor,
            check_in = %punch.check_in,
            check_out = %punch.check_out,
            "Punch corrected"
        );

        let (recomputed, recompute_warning) = match self.engine.compute_daily_hours(&punch) {
            Ok(computation) if computation.persisted => (Some(computation.result), None),
            Ok(computation) => {
                let message = computation
                    .warnings
                    .iter()
                    .map(|w| w.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                (Some(computation.result), Some(message))
            }
            Err(err) => {
                let failure = EngineError::RecomputeFailed {
                    punch_id: punch.id.clone(),
                    message: err.to_string(),
                };
                warn!(punch_id = %punch.id, error = %failure, "Recompute after correction failed");
                (None, Some(failure.to_string()))
            }
        };

        Ok(CorrectionOutcome {
            punch,
            entry,
            recomputed,
            recompute_warning,
        })
    }

    /// A punch's corrections, newest first.
    pub fn get_history(&self, punch_id: &str) -> EngineResult<Vec<CorrectionEntry>> {
        let entries: Vec<CorrectionEntry> = self
            .engine
            .repository()
            .load(Collection::CorrectionLedger)?;
        let mut history: Vec<_> = entries
            .into_iter()
            .filter(|e| e.punch_id == punch_id)
            .collect();
        history.reverse();
        Ok(history)
    }
}
