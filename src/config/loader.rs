//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration and the employee directory from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::EmployeeProfile;

use super::types::{EmployeesConfig, EngineConfig};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml     # Tolerance, day window, caps, notifier, holidays
/// └── employees.yaml  # Employee directory (optional)
/// ```
///
/// # Example
///
/// ```no_run
/// use timebank_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Tolerance: {} min", loader.config().lateness_tolerance_minutes);
/// println!("Known employees: {}", loader.employees().len());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: EngineConfig,
    employees: Vec<EmployeeProfile>,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if `engine.yaml` is missing or either file contains
    /// invalid YAML. A missing `employees.yaml` leaves the directory empty.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let config = Self::load_yaml::<EngineConfig>(&path.join("engine.yaml"))?;
        validate(&config, &path.join("engine.yaml"))?;

        let employees_path = path.join("employees.yaml");
        let employees = if employees_path.exists() {
            Self::load_yaml::<EmployeesConfig>(&employees_path)?.employees
        } else {
            Vec::new()
        };

        Ok(Self { config, employees })
    }

    /// Builds a loader from already-parsed parts.
    pub fn from_parts(config: EngineConfig, employees: Vec<EmployeeProfile>) -> Self {
        Self { config, employees }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the directory profiles.
    pub fn employees(&self) -> &[EmployeeProfile] {
        &self.employees
    }

    /// Splits the loader into its parts.
    pub fn into_parts(self) -> (EngineConfig, Vec<EmployeeProfile>) {
        (self.config, self.employees)
    }
}

fn validate(config: &EngineConfig, path: &Path) -> EngineResult<()> {
    let fail = |message: &str| EngineError::ConfigParseError {
        path: path.display().to_string(),
        message: message.to_string(),
    };

    if config.lateness_tolerance_minutes < 0 {
        return Err(fail("lateness_tolerance_minutes must not be negative"));
    }
    if config.day_window.start >= config.day_window.end {
        return Err(fail("day_window.start must be before day_window.end"));
    }
    if config.default_caps.daily_cap.is_sign_negative()
        || config.default_caps.monthly_cap.is_sign_negative()
    {
        return Err(fail("default caps must not be negative"));
    }
    if config.max_shift_hours <= rust_decimal::Decimal::ZERO
        || config.max_shift_hours > rust_decimal::Decimal::from(24)
    {
        return Err(fail("max_shift_hours must be within (0, 24]"));
    }
    if config.batch.yield_every == 0 {
        return Err(fail("batch.yield_every must be at least 1"));
    }
    Ok(())
}
