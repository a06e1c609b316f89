//! Request types for the time-bank engine API.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CapLimits, PunchCorrection, PunchRecord, PunchStatus};

/// A punch as posted to `/punches` or `/compute`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PunchRequest {
    /// Unique identifier for the punch.
    pub id: String,
    /// The employee who punched.
    pub employee_id: String,
    /// The working day.
    pub date: NaiveDate,
    /// Check-in as `HH:mm`.
    pub check_in: String,
    /// Check-out as `HH:mm`.
    pub check_out: String,
    /// Break start as `HH:mm`.
    #[serde(default)]
    pub break_start: Option<String>,
    /// Break end as `HH:mm`.
    #[serde(default)]
    pub break_end: Option<String>,
}

impl From<PunchRequest> for PunchRecord {
    fn from(req: PunchRequest) -> Self {
        PunchRecord {
            id: req.id,
            employee_id: req.employee_id,
            date: req.date,
            check_in: req.check_in,
            check_out: req.check_out,
            break_start: req.break_start,
            break_end: req.break_end,
            status: PunchStatus::Original,
            corrected_by: None,
            last_modified: Utc::now(),
        }
    }
}

/// Request body for `POST /punches`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPunchesRequest {
    /// Punches to import.
    pub punches: Vec<PunchRequest>,
}

/// Request body for `POST /punches/:id/corrections`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionRequest {
    /// Replacement check-in as `HH:mm`.
    #[serde(default)]
    pub new_check_in: Option<String>,
    /// Replacement check-out as `HH:mm`.
    #[serde(default)]
    pub new_check_out: Option<String>,
    /// Why the punch is being changed.
    pub reason: String,
    /// Who is making the change.
    pub corrected_by: String,
}

impl CorrectionRequest {
    /// Splits the request into the correction and its actor.
    pub fn into_parts(self) -> (PunchCorrection, String) {
        (
            PunchCorrection {
                new_check_in: self.new_check_in,
                new_check_out: self.new_check_out,
                reason: self.reason,
            },
            self.corrected_by,
        )
    }
}

/// Request body for `POST /recalc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecalcRequest {
    /// Whose punches to recompute.
    pub employee_id: String,
    /// First day, inclusive.
    pub date_from: NaiveDate,
    /// Last day, inclusive.
    pub date_to: NaiveDate,
}

/// Request body for `PUT /departments/:department/cap`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapRequest {
    /// Countable overtime per day.
    pub daily_cap: Decimal,
    /// Countable overtime per calendar month.
    pub monthly_cap: Decimal,
    /// Who is making the change.
    pub updated_by: String,
}

impl CapRequest {
    /// The requested limits.
    pub fn limits(&self) -> CapLimits {
        CapLimits {
            daily_cap: self.daily_cap,
            monthly_cap: self.monthly_cap,
        }
    }
}

/// Query string of `DELETE /departments/:department/cap`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorQuery {
    /// Who is making the change.
    pub actor: String,
}
