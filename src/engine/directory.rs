//! Employee directory port.

use std::collections::HashMap;

use crate::models::EmployeeProfile;

/// Looks up an employee's working terms.
///
/// Returning `None` is not an error: the engine falls back to its default
/// profile and records a warning.
pub trait EmployeeDirectory: Send + Sync {
    /// Resolves the profile for `employee_id`.
    fn resolve(&self, employee_id: &str) -> Option<EmployeeProfile>;
}

/// A fixed, in-memory directory.
///
/// # Example
///
/// ```
/// use timebank_engine::engine::{EmployeeDirectory, StaticDirectory};
/// use timebank_engine::models::EmployeeProfile;
///
/// let directory = StaticDirectory::new(vec![EmployeeProfile::fallback("emp_001")]);
/// assert!(directory.resolve("emp_001").is_some());
/// assert!(directory.resolve("emp_999").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    profiles: HashMap<String, EmployeeProfile>,
}

impl StaticDirectory {
    /// Indexes the given profiles by employee id. Later duplicates win.
    pub fn new(profiles: impl IntoIterator<Item = EmployeeProfile>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|profile| (profile.employee_id.clone(), profile))
                .collect(),
        }
    }

    /// Number of known employees.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns true when no employee is known.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl EmployeeDirectory for StaticDirectory {
    fn resolve(&self, employee_id: &str) -> Option<EmployeeProfile> {
        self.profiles.get(employee_id).cloned()
    }
}
