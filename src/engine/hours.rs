//! Hours computation engine.
//!
//! [`HoursEngine`] turns one punch into its [`ComputedResult`]: it validates
//! the recorded times, resolves the employee's terms, runs the calculation
//! rules, applies the department caps, persists the result (replacing any
//! previous one for the punch), appends the audit trail and offers a
//! recompute notice.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::{
    HolidayCalendar, Lateness, OvertimeBreakdown, TimeBankBalance, compute_overtime,
    compute_time_bank, is_weekend, parse_hhmm, verify_lateness, worked_hours,
};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, CapsApplied, ComputationLogEntry, ComputedResult,
    CorrectionEntry, EmployeeProfile, PunchRecord,
};
use crate::store::{Collection, Repository};

use super::caps::{DAILY_CAP_EXCEEDED, MONTHLY_CAP_EXCEEDED, OvertimeCapEnforcer};
use super::directory::EmployeeDirectory;
use super::ledger::{project, validate_shift_span};
use super::notifier::{EventSink, RecomputeEvent, RecomputeNotice, RecomputeNotifier};

/// Warning code for an employee missing from the directory.
pub const PROFILE_NOT_FOUND: &str = "PROFILE_NOT_FOUND";

/// Warning code for a punch carrying only one break bound.
pub const INCOMPLETE_BREAK: &str = "INCOMPLETE_BREAK";

/// Warning code for a computed result that could not be saved.
pub const PERSISTENCE_FAILED: &str = "PERSISTENCE_FAILED";

/// The outcome of computing one punch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Computation {
    /// The computed figures.
    pub result: ComputedResult,
    /// False when the result or its audit entry could not be saved.
    pub persisted: bool,
    /// Non-fatal conditions met along the way.
    pub warnings: Vec<AuditWarning>,
}

/// A punch that failed during batch recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalcFailure {
    /// The punch that failed.
    pub punch_id: String,
    /// Why it failed.
    pub message: String,
}

/// Outcome of a batch recomputation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalcSummary {
    /// Punches recomputed successfully.
    pub count: usize,
    /// Punches that failed; the batch carried on past them.
    pub failures: Vec<RecalcFailure>,
}

/// Orchestrates punch computation, persistence and notification.
///
/// The engine is `Send + Sync` and meant to be shared behind an [`Arc`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use timebank_engine::config::EngineConfig;
/// use timebank_engine::engine::{HoursEngine, StaticDirectory, TracingSink};
/// use timebank_engine::models::PunchRecord;
/// use timebank_engine::store::{MemoryStore, Repository};
///
/// let engine = HoursEngine::new(
///     EngineConfig::default(),
///     Arc::new(Repository::new(Arc::new(MemoryStore::new()))),
///     Arc::new(StaticDirectory::default()),
///     Arc::new(TracingSink),
/// );
///
/// let punch = PunchRecord::new(
///     "punch_001",
///     "emp_001",
///     NaiveDate::from_ymd_opt(2026, 1, 14).unwrap(),
///     "08:00",
///     "18:00",
/// );
/// let computation = engine.compute_daily_hours(&punch).unwrap();
/// assert_eq!(computation.result.worked_hours, Decimal::new(10, 0));
/// assert_eq!(computation.result.overtime.total, Decimal::new(2, 0));
/// assert!(computation.persisted);
/// ```
pub struct HoursEngine {
    config: EngineConfig,
    calendar: HolidayCalendar,
    repository: Arc<Repository>,
    directory: Arc<dyn EmployeeDirectory>,
    caps: OvertimeCapEnforcer,
    notifier: RecomputeNotifier,
    department_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for HoursEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoursEngine")
            .field("config", &self.config)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

impl HoursEngine {
    /// Creates an engine.
    pub fn new(
        config: EngineConfig,
        repository: Arc<Repository>,
        directory: Arc<dyn EmployeeDirectory>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let calendar = config.holidays.calendar();
        let caps = OvertimeCapEnforcer::new(repository.clone(), config.default_caps);
        let notifier = RecomputeNotifier::new(
            config.notifications.debounce(),
            config.notifications.min_interval(),
            sink,
        );
        Self {
            config,
            calendar,
            repository,
            directory,
            caps,
            notifier,
            department_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The holiday calendar in use.
    pub fn calendar(&self) -> &HolidayCalendar {
        &self.calendar
    }

    /// The cap enforcer.
    pub fn caps(&self) -> &OvertimeCapEnforcer {
        &self.caps
    }

    /// The recompute notifier.
    pub fn notifier(&self) -> &RecomputeNotifier {
        &self.notifier
    }

    pub(crate) fn repository(&self) -> &Arc<Repository> {
        &self.repository
    }

    /// Resolves an employee's terms; `None` means the default profile applies.
    pub fn resolve_profile(&self, employee_id: &str) -> Option<EmployeeProfile> {
        self.directory.resolve(employee_id)
    }

    /// Computes, persists and announces the result for one punch.
    ///
    /// Malformed input is an [`EngineError::Validation`] and produces no
    /// result. Besides badly formed `HH:mm` times and an empty employee id,
    /// this includes a check-out earlier than check-in whose wrapped span
    /// exceeds `max_shift_hours` (field `check_out`). Once the figures
    /// exist, failing to save them is reported as a warning with
    /// `persisted == false` rather than an error.
    pub fn compute_daily_hours(&self, punch: &PunchRecord) -> EngineResult<Computation> {
        let started = Instant::now();
        let mut steps: Vec<AuditStep> = Vec::new();
        let mut warnings: Vec<AuditWarning> = Vec::new();

        let times = ShiftTimes::parse(punch)?;
        validate_shift_span(times.check_in, times.check_out, self.config.max_shift_hours)?;
        if times.break_start.is_some() != times.break_end.is_some() {
            warnings.push(AuditWarning::new(
                INCOMPLETE_BREAK,
                "Only one break bound was recorded; no break was deducted",
                "low",
            ));
        }

        let profile = match self.directory.resolve(&punch.employee_id) {
            Some(profile) => profile,
            None => {
                warnings.push(AuditWarning::new(
                    PROFILE_NOT_FOUND,
                    format!(
                        "Employee '{}' is not in the directory; default terms applied",
                        punch.employee_id
                    ),
                    "medium",
                ));
                self.config.default_profile.profile_for(&punch.employee_id)
            }
        };
        let contractual = profile.contractual_daily_hours;

        let worked = worked_hours(
            times.check_in,
            times.check_out,
            times.break_start,
            times.break_end,
        );
        steps.push(worked_step(steps.len() as u32 + 1, punch, worked));

        let lateness = verify_lateness(
            profile.expected_check_in,
            times.check_in,
            self.config.lateness_tolerance_minutes,
        );
        steps.push(lateness_step(
            steps.len() as u32 + 1,
            &profile,
            punch,
            lateness,
            self.config.lateness_tolerance_minutes,
        ));

        let is_holiday = self.calendar.is_holiday(punch.date);
        let is_weekend = is_weekend(punch.date);
        steps.push(day_kind_step(steps.len() as u32 + 1, self, punch.date));

        let mut overtime = compute_overtime(
            times.check_in,
            times.check_out,
            worked,
            contractual,
            punch.date,
            &self.calendar,
            &self.config.day_window,
        );
        steps.push(overtime_step(steps.len() as u32 + 1, worked, contractual, &overtime));

        let department = profile.department.as_deref();
        let lock = self.department_lock(department);
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let uncapped = overtime.total;
        let daily = self.caps.check_daily(department, uncapped)?;
        steps.push(daily.audit_step(uncapped, steps.len() as u32 + 1));
        if daily.exceeded {
            overtime = overtime.rescale_to(daily.cap);
            warnings.push(AuditWarning::new(
                DAILY_CAP_EXCEEDED,
                format!(
                    "{} overtime hours truncated to the {} hour daily cap",
                    uncapped, daily.cap
                ),
                "medium",
            ));
        }

        let accumulated_before = self.caps.monthly_accumulated_excluding(
            &punch.employee_id,
            punch.date.month(),
            punch.date.year(),
            Some(&punch.id),
        )?;
        let cumulative = accumulated_before + overtime.total;
        let monthly = self.caps.check_monthly(department, cumulative)?;
        steps.push(monthly.audit_step(cumulative, steps.len() as u32 + 1));
        if monthly.exceeded {
            warnings.push(AuditWarning::new(
                MONTHLY_CAP_EXCEEDED,
                format!(
                    "{} month-to-date overtime hours exceed the {} hour monthly cap",
                    cumulative, monthly.cap
                ),
                "high",
            ));
        }

        let time_bank = compute_time_bank(worked, contractual);
        steps.push(time_bank_step(steps.len() as u32 + 1, worked, contractual, time_bank));

        let computed_at = Utc::now();
        let result = ComputedResult {
            punch_id: punch.id.clone(),
            employee_id: punch.employee_id.clone(),
            date: punch.date,
            worked_hours: worked,
            contractual_hours: contractual,
            overtime,
            time_bank,
            lateness,
            is_holiday,
            is_weekend,
            computed_at,
            caps_applied: CapsApplied {
                daily_exceeded: daily.exceeded,
                monthly_exceeded: monthly.exceeded,
                daily_cap: daily.cap,
                monthly_cap: monthly.cap,
                monthly_accumulated: cumulative,
                department: profile.department.clone(),
            },
        };

        let mut persisted = true;
        if let Err(err) = self.upsert_result(&result) {
            persisted = false;
            warn!(punch_id = %punch.id, error = %err, "Computed result not saved");
            warnings.push(AuditWarning::new(PERSISTENCE_FAILED, err.to_string(), "high"));
        }
        drop(guard);

        let trace = AuditTrace {
            steps,
            warnings: warnings.clone(),
            duration_us: started.elapsed().as_micros() as u64,
        };
        if persisted {
            let entry = ComputationLogEntry {
                id: Uuid::new_v4(),
                punch_id: punch.id.clone(),
                employee_id: punch.employee_id.clone(),
                computed_at,
                trace,
            };
            if let Err(err) = self.repository.append(Collection::ComputationLog, entry) {
                persisted = false;
                warn!(punch_id = %punch.id, error = %err, "Computation log entry not saved");
                warnings.push(AuditWarning::new(PERSISTENCE_FAILED, err.to_string(), "high"));
            }
        }

        info!(
            punch_id = %punch.id,
            employee_id = %punch.employee_id,
            worked_hours = %result.worked_hours,
            overtime_hours = %result.overtime.total,
            balance = %result.time_bank.balance,
            persisted = persisted,
            warnings = warnings.len(),
            "Punch computed"
        );

        if persisted {
            self.notifier.offer(
                RecomputeEvent::new(&punch.id, &punch.employee_id),
                Instant::now(),
            );
        }

        Ok(Computation {
            result,
            persisted,
            warnings,
        })
    }

    /// Imports already-recorded punches, replacing any with the same id.
    ///
    /// Every punch is validated before anything is written.
    pub fn record_punches(&self, punches: Vec<PunchRecord>) -> EngineResult<usize> {
        for punch in &punches {
            if punch.id.trim().is_empty() {
                return Err(EngineError::validation("id", "must not be empty"));
            }
            let times = ShiftTimes::parse(punch)?;
            validate_shift_span(times.check_in, times.check_out, self.config.max_shift_hours)?;
        }

        let count = punches.len();
        self.repository
            .update(Collection::Punches, |stored: &mut Vec<PunchRecord>| {
                for punch in punches {
                    match stored.iter_mut().find(|p| p.id == punch.id) {
                        Some(existing) => *existing = punch,
                        None => stored.push(punch),
                    }
                }
                Ok(())
            })?;

        debug!(count = count, "Punches recorded");
        Ok(count)
    }

    /// The punch's current state, rebuilt from the correction ledger.
    pub fn current_punch(&self, punch_id: &str) -> EngineResult<PunchRecord> {
        let punches: Vec<PunchRecord> = self.repository.load(Collection::Punches)?;
        let stored = punches
            .into_iter()
            .find(|p| p.id == punch_id)
            .ok_or_else(|| EngineError::PunchNotFound {
                punch_id: punch_id.to_string(),
            })?;
        let entries: Vec<CorrectionEntry> = self.repository.load(Collection::CorrectionLedger)?;
        Ok(project(&stored, &entries))
    }

    /// Computes the stored punch in its current state.
    pub fn compute_stored(&self, punch_id: &str) -> EngineResult<Computation> {
        let punch = self.current_punch(punch_id)?;
        self.compute_daily_hours(&punch)
    }

    /// The live result for a punch, if it was ever computed.
    pub fn result_for(&self, punch_id: &str) -> EngineResult<Option<ComputedResult>> {
        let results: Vec<ComputedResult> = self.repository.load(Collection::ComputedResults)?;
        Ok(results.into_iter().find(|r| r.punch_id == punch_id))
    }

    /// An employee's live results for one calendar month, by date.
    pub fn results_for(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<Vec<ComputedResult>> {
        let results: Vec<ComputedResult> = self.repository.load(Collection::ComputedResults)?;
        let mut results: Vec<_> = results
            .into_iter()
            .filter(|r| r.employee_id == employee_id)
            .filter(|r| r.date.year() == year && r.date.month() == month)
            .collect();
        results.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.punch_id.cmp(&b.punch_id)));
        Ok(results)
    }

    /// Every audit entry recorded for a punch, oldest first.
    pub fn computation_log(&self, punch_id: &str) -> EngineResult<Vec<ComputationLogEntry>> {
        let entries: Vec<ComputationLogEntry> =
            self.repository.load(Collection::ComputationLog)?;
        Ok(entries
            .into_iter()
            .filter(|e| e.punch_id == punch_id)
            .collect())
    }

    /// Recomputes every punch of an employee dated within `[from, to]`.
    ///
    /// Per-punch failures are collected and do not stop the batch.
    pub fn recalc_range(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<RecalcSummary> {
        let punches = self.punches_in_range(employee_id, from, to)?;
        let mut summary = RecalcSummary::default();
        for punch in &punches {
            self.recalc_one(punch, &mut summary);
        }
        log_summary(employee_id, &summary);
        Ok(summary)
    }

    /// Like [`recalc_range`](Self::recalc_range), yielding to the runtime
    /// every `batch.yield_every` punches.
    pub async fn recalc_range_cooperative(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<RecalcSummary> {
        let punches = self.punches_in_range(employee_id, from, to)?;
        let yield_every = self.config.batch.yield_every.max(1);
        let mut summary = RecalcSummary::default();
        for (index, punch) in punches.iter().enumerate() {
            self.recalc_one(punch, &mut summary);
            if (index + 1) % yield_every == 0 {
                tokio::task::yield_now().await;
            }
        }
        log_summary(employee_id, &summary);
        Ok(summary)
    }

    /// Releases the pending recompute notice if it is due.
    pub fn flush_notifications(&self) -> Option<RecomputeNotice> {
        self.notifier.tick(Instant::now())
    }

    fn recalc_one(&self, punch: &PunchRecord, summary: &mut RecalcSummary) {
        match self.compute_daily_hours(punch) {
            Ok(_) => summary.count += 1,
            Err(err) => {
                warn!(punch_id = %punch.id, error = %err, "Recalculation failed");
                summary.failures.push(RecalcFailure {
                    punch_id: punch.id.clone(),
                    message: err.to_string(),
                });
            }
        }
    }

    fn punches_in_range(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<PunchRecord>> {
        if employee_id.trim().is_empty() {
            return Err(EngineError::validation("employee_id", "must not be empty"));
        }
        if from > to {
            return Err(EngineError::validation(
                "date_from",
                format!("{} is after {}", from, to),
            ));
        }

        let punches: Vec<PunchRecord> = self.repository.load(Collection::Punches)?;
        let entries: Vec<CorrectionEntry> = self.repository.load(Collection::CorrectionLedger)?;
        let mut selected: Vec<PunchRecord> = punches
            .iter()
            .filter(|p| p.employee_id == employee_id && p.date >= from && p.date <= to)
            .map(|p| project(p, &entries))
            .collect();
        selected.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(selected)
    }

    fn upsert_result(&self, result: &ComputedResult) -> EngineResult<()> {
        self.repository
            .update(Collection::ComputedResults, |results: &mut Vec<ComputedResult>| {
                match results.iter_mut().find(|r| r.punch_id == result.punch_id) {
                    Some(existing) => *existing = result.clone(),
                    None => results.push(result.clone()),
                }
                Ok(())
            })
    }

    fn department_lock(&self, department: Option<&str>) -> Arc<Mutex<()>> {
        let mut locks = self
            .department_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(department.unwrap_or_default().to_string())
            .or_default()
            .clone()
    }
}

fn log_summary(employee_id: &str, summary: &RecalcSummary) {
    info!(
        employee_id = %employee_id,
        recomputed = summary.count,
        failed = summary.failures.len(),
        "Recalculation finished"
    );
}

/// The validated wall-clock times of a punch.
struct ShiftTimes {
    check_in: NaiveTime,
    check_out: NaiveTime,
    break_start: Option<NaiveTime>,
    break_end: Option<NaiveTime>,
}

impl ShiftTimes {
    fn parse(punch: &PunchRecord) -> EngineResult<Self> {
        if punch.employee_id.trim().is_empty() {
            return Err(EngineError::validation("employee_id", "must not be empty"));
        }
        Ok(Self {
            check_in: parse_hhmm(&punch.check_in, "check_in")?,
            check_out: parse_hhmm(&punch.check_out, "check_out")?,
            break_start: punch
                .break_start
                .as_deref()
                .map(|v| parse_hhmm(v, "break_start"))
                .transpose()?,
            break_end: punch
                .break_end
                .as_deref()
                .map(|v| parse_hhmm(v, "break_end"))
                .transpose()?,
        })
    }
}

fn worked_step(step_number: u32, punch: &PunchRecord, worked: Decimal) -> AuditStep {
    let deducted = punch.break_start.is_some() && punch.break_end.is_some();
    AuditStep {
        step_number,
        rule_id: "worked_hours".to_string(),
        rule_name: "Worked Hours".to_string(),
        input: serde_json::json!({
            "check_in": punch.check_in,
            "check_out": punch.check_out,
            "break_start": punch.break_start,
            "break_end": punch.break_end,
        }),
        output: serde_json::json!({ "worked_hours": worked.to_string() }),
        reasoning: if deducted {
            format!("{} hours worked after deducting the break", worked)
        } else {
            format!("{} hours worked, no break deducted", worked)
        },
    }
}

fn lateness_step(
    step_number: u32,
    profile: &EmployeeProfile,
    punch: &PunchRecord,
    lateness: Lateness,
    tolerance: i64,
) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: "lateness".to_string(),
        rule_name: "Lateness Check".to_string(),
        input: serde_json::json!({
            "expected_check_in": profile.expected_check_in.format("%H:%M").to_string(),
            "check_in": punch.check_in,
            "tolerance_minutes": tolerance,
        }),
        output: serde_json::json!({
            "is_late": lateness.is_late,
            "minutes": lateness.minutes,
        }),
        reasoning: if lateness.is_late {
            format!(
                "Checked in {} minutes late, beyond the {} minute tolerance",
                lateness.minutes, tolerance
            )
        } else {
            format!("Within the {} minute tolerance", tolerance)
        },
    }
}

fn day_kind_step(step_number: u32, engine: &HoursEngine, date: NaiveDate) -> AuditStep {
    let kind = engine.calendar.day_kind(date);
    let holiday = engine.calendar.holiday_on(date);
    AuditStep {
        step_number,
        rule_id: "day_classification".to_string(),
        rule_name: "Day Classification".to_string(),
        input: serde_json::json!({ "date": date.to_string() }),
        output: serde_json::json!({
            "day_kind": kind,
            "holiday": holiday.as_ref().map(|h| h.name.clone()),
        }),
        reasoning: match holiday {
            Some(holiday) => format!("{} is {}", date, holiday.name),
            None => format!("{} is a {}", date, kind),
        },
    }
}

fn overtime_step(
    step_number: u32,
    worked: Decimal,
    contractual: Decimal,
    overtime: &OvertimeBreakdown,
) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: "overtime_buckets".to_string(),
        rule_name: "Overtime Buckets".to_string(),
        input: serde_json::json!({
            "worked_hours": worked.to_string(),
            "contractual_hours": contractual.to_string(),
        }),
        output: serde_json::json!({
            "total": overtime.total.to_string(),
            "day": overtime.day.to_string(),
            "night": overtime.night.to_string(),
            "holiday": overtime.holiday.to_string(),
        }),
        reasoning: if overtime.total > Decimal::ZERO {
            format!(
                "{} overtime hours: {} day, {} night, {} holiday",
                overtime.total, overtime.day, overtime.night, overtime.holiday
            )
        } else {
            "No hours beyond the contractual day".to_string()
        },
    }
}

fn time_bank_step(
    step_number: u32,
    worked: Decimal,
    contractual: Decimal,
    time_bank: TimeBankBalance,
) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: "time_bank".to_string(),
        rule_name: "Time Bank".to_string(),
        input: serde_json::json!({
            "worked_hours": worked.to_string(),
            "contractual_hours": contractual.to_string(),
        }),
        output: serde_json::json!({
            "positive": time_bank.positive.to_string(),
            "negative": time_bank.negative.to_string(),
            "balance": time_bank.balance.to_string(),
        }),
        reasoning: format!("Balance {} hours", time_bank.balance),
    }
}
