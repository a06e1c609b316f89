//! Correction ledger entries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum length of a correction reason, after trimming.
pub const MIN_REASON_CHARS: usize = 10;

/// A requested change to a punch's times.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PunchCorrection {
    /// Replacement check-in as `HH:mm`.
    #[serde(default)]
    pub new_check_in: Option<String>,
    /// Replacement check-out as `HH:mm`.
    #[serde(default)]
    pub new_check_out: Option<String>,
    /// Why the punch is being changed.
    pub reason: String,
}

/// One immutable, appended record of a punch edit.
///
/// Both the original and new values are always filled in, so folding the
/// entries in order reproduces the punch's current times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// The corrected punch.
    pub punch_id: String,
    /// The punch's employee.
    pub employee_id: String,
    /// The punch's working day.
    pub date: NaiveDate,
    /// Check-in before this correction.
    pub original_check_in: String,
    /// Check-in after this correction.
    pub new_check_in: String,
    /// Check-out before this correction.
    pub original_check_out: String,
    /// Check-out after this correction.
    pub new_check_out: String,
    /// Why the change was made.
    pub reason: String,
    /// Who made the change.
    pub corrected_by: String,
    /// When the change was made.
    pub corrected_at: DateTime<Utc>,
}

impl CorrectionEntry {
    /// Returns true when the check-in changed.
    pub fn changes_check_in(&self) -> bool {
        self.original_check_in != self.new_check_in
    }

    /// Returns true when the check-out changed.
    pub fn changes_check_out(&self) -> bool {
        self.original_check_out != self.new_check_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correction_request_defaults() {
        let correction: PunchCorrection =
            serde_json::from_str(r#"{"new_check_out":"18:00","reason":"Forgot to clock out"}"#)
                .unwrap();
        assert!(correction.new_check_in.is_none());
        assert_eq!(correction.new_check_out.as_deref(), Some("18:00"));
    }

    #[test]
    fn test_change_flags() {
        let entry = CorrectionEntry {
            id: Uuid::new_v4(),
            punch_id: "p1".to_string(),
            employee_id: "e1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 14).unwrap(),
            original_check_in: "08:00".to_string(),
            new_check_in: "08:00".to_string(),
            original_check_out: "17:00".to_string(),
            new_check_out: "18:00".to_string(),
            reason: "Stayed for inventory count".to_string(),
            corrected_by: "supervisor".to_string(),
            corrected_at: Utc::now(),
        };
        assert!(!entry.changes_check_in());
        assert!(entry.changes_check_out());

        let json = serde_json::to_string(&entry).unwrap();
        let back: CorrectionEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
