//! Error types for algoscope.
//!
//! Every fallible operation returns `Result<T, VizError>` instead of panicking.
//! Failures are local to one "generate" or one control action: they never
//! touch a previously materialized buffer or the playback position.

use thiserror::Error;

/// Result type alias for algoscope operations.
pub type VizResult<T> = Result<T, VizError>;

/// Unified error type for all algoscope operations.
#[derive(Debug, Error)]
pub enum VizError {
    // ===== Input Errors =====
    /// Input is malformed or violates a tracer precondition.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input.
        message: String,
    },

    /// Input exceeds the configured size ceiling.
    #[error("Input too large: {len} exceeds the limit of {limit}")]
    InputTooLarge {
        /// Observed input size (elements or grid cells).
        len: usize,
        /// Configured ceiling.
        limit: usize,
    },

    /// Requested algorithm name is not known.
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    // ===== Materialization Guards =====
    /// A tracer produced more steps than the configured guard allows.
    #[error("Trace exceeded {limit} steps")]
    StepLimitExceeded {
        /// Configured step ceiling.
        limit: usize,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl VizError {
    /// Create an invalid-input error with a message.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Check if this error was caused by user-supplied input.
    ///
    /// Input errors are surfaced to the user and require a new action;
    /// everything else points at the environment or configuration.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::InputTooLarge { .. } | Self::UnknownAlgorithm(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_detection() {
        assert!(VizError::invalid_input("bad").is_input_error());
        assert!(VizError::InputTooLarge { len: 51, limit: 50 }.is_input_error());
        assert!(VizError::UnknownAlgorithm("quick".into()).is_input_error());

        assert!(!VizError::config("bad").is_input_error());
        assert!(!VizError::StepLimitExceeded { limit: 10 }.is_input_error());
        assert!(!VizError::serialization("bad").is_input_error());
    }

    #[test]
    fn test_error_display_invalid_input() {
        let msg = VizError::invalid_input("grid is not rectangular").to_string();
        assert!(msg.contains("Invalid input"));
        assert!(msg.contains("grid is not rectangular"));
    }

    #[test]
    fn test_error_display_too_large() {
        let msg = VizError::InputTooLarge { len: 51, limit: 50 }.to_string();
        assert!(msg.contains("51"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn test_error_display_step_limit() {
        let msg = VizError::StepLimitExceeded { limit: 100 }.to_string();
        assert!(msg.contains("100 steps"));
    }

    #[test]
    fn test_error_config() {
        let msg = VizError::config("min_speed must be positive").to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("min_speed"));
    }

    #[test]
    fn test_error_io_from() {
        let err: VizError = std::io::Error::other("disk gone").into();
        assert!(!err.is_input_error());
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_debug() {
        let debug = format!("{:?}", VizError::config("test"));
        assert!(debug.contains("Config"));
    }
}
