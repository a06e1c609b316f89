//! Error types for the time-bank engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing punch hours.
//! Business states such as a capped overtime figure or a missing directory
//! profile are not errors; they are reported on the computed result.

use thiserror::Error;

/// The main error type for the time-bank engine.
///
/// # Example
///
/// ```
/// use timebank_engine::error::EngineError;
///
/// let error = EngineError::PunchNotFound {
///     punch_id: "punch_042".to_string(),
/// };
/// assert_eq!(error.to_string(), "Punch not found: punch_042");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input was malformed or missing. Never retried, no result is produced.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The requested punch does not exist.
    #[error("Punch not found: {punch_id}")]
    PunchNotFound {
        /// The punch id that was looked up.
        punch_id: String,
    },

    /// Reading or writing a persisted collection failed.
    #[error("Persistence error on '{collection}': {message}")]
    Persistence {
        /// The collection being accessed.
        collection: String,
        /// A description of the storage failure.
        message: String,
    },

    /// A correction was stored but recomputing its result failed.
    #[error("Recompute after correction of '{punch_id}' failed: {message}")]
    RecomputeFailed {
        /// The corrected punch.
        punch_id: String,
        /// Why the recomputation failed.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for building a [`EngineError::Validation`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true when the error was caused by the caller's input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, EngineError::Validation { .. })
    }

    /// Returns true for unknown punches.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::PunchNotFound { .. })
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_displays_field_and_message() {
        let error = EngineError::validation("check_in", "expected HH:mm, got '25:00'");
        assert_eq!(
            error.to_string(),
            "Invalid check_in: expected HH:mm, got '25:00'"
        );
        assert!(error.is_invalid_input());
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_not_found_variants() {
        let punch = EngineError::PunchNotFound {
            punch_id: "p1".to_string(),
        };
        assert!(punch.is_not_found());
        assert_eq!(punch.to_string(), "Punch not found: p1");
        assert!(!EngineError::validation("id", "must not be empty").is_not_found());
    }

    #[test]
    fn test_persistence_displays_collection() {
        let error = EngineError::Persistence {
            collection: "computed_results".to_string(),
            message: "disk full".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Persistence error on 'computed_results': disk full"
        );
        assert!(!error.is_invalid_input());
    }

    #[test]
    fn test_recompute_failed_displays_punch() {
        let error = EngineError::RecomputeFailed {
            punch_id: "p7".to_string(),
            message: "store offline".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Recompute after correction of 'p7' failed: store offline"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/engine.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/engine.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_not_found() -> EngineResult<()> {
            Err(EngineError::PunchNotFound {
                punch_id: "missing".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
