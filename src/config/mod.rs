//! Configuration loading and management for the time-bank engine.
//!
//! This module loads the engine settings (`engine.yaml`) and the employee
//! directory (`employees.yaml`) from a configuration directory. Every
//! setting has a default, so [`EngineConfig::default`] runs the engine
//! without any file at all.
//!
//! # Example
//!
//! ```no_run
//! use timebank_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/default").unwrap();
//! println!("Day window starts at {}", loader.config().day_window.start);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BatchSettings, DEFAULT_MAX_SHIFT_HOURS, EmployeesConfig, EngineConfig, HolidaySettings,
    NotificationSettings, ProfileDefaults,
};
