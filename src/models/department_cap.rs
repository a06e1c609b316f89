//! Department overtime caps and their change log.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default daily overtime cap in hours.
pub const DEFAULT_DAILY_CAP_HOURS: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// Default monthly overtime cap in hours.
pub const DEFAULT_MONTHLY_CAP_HOURS: Decimal = Decimal::from_parts(40, 0, 0, false, 0);

/// Daily and monthly overtime ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapLimits {
    /// Countable overtime per day.
    pub daily_cap: Decimal,
    /// Countable overtime per calendar month.
    pub monthly_cap: Decimal,
}

impl Default for CapLimits {
    fn default() -> Self {
        Self {
            daily_cap: DEFAULT_DAILY_CAP_HOURS,
            monthly_cap: DEFAULT_MONTHLY_CAP_HOURS,
        }
    }
}

/// A department's configured caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentCap {
    /// Department name.
    pub department: String,
    /// Countable overtime per day.
    pub daily_cap: Decimal,
    /// Countable overtime per calendar month.
    pub monthly_cap: Decimal,
    /// Who last changed the caps.
    pub updated_by: String,
    /// When the caps last changed.
    pub updated_at: DateTime<Utc>,
}

impl DepartmentCap {
    /// The configured limits.
    pub fn limits(&self) -> CapLimits {
        CapLimits {
            daily_cap: self.daily_cap,
            monthly_cap: self.monthly_cap,
        }
    }
}

/// What happened to a department's caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapChangeAction {
    /// First configuration for the department.
    Created,
    /// Existing caps replaced.
    Updated,
    /// Caps deleted; defaults apply again.
    Removed,
}

/// Immutable audit record of a cap change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapChangeLogEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// Department affected.
    pub department: String,
    /// Kind of change.
    pub action: CapChangeAction,
    /// Limits before the change.
    pub previous: Option<CapLimits>,
    /// Limits after the change.
    pub current: Option<CapLimits>,
    /// Who made the change.
    pub actor: String,
    /// When the change was made.
    pub changed_at: DateTime<Utc>,
}
