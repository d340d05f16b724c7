//! Error types for calibration configuration.

use thiserror::Error;

/// Errors that can occur while loading or validating a calibration setup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration value is out of its valid domain.
    #[error("invalid configuration: {field}: {reason}")]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Setup file is not valid JSON for this schema.
    #[error("setup parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Create an invalid value error.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Check if this error came from value validation rather than I/O or parsing.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
