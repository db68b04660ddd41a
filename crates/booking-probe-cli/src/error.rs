//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// The suite ran and some scenarios did not pass
    #[error("Suite failed: {summary}")]
    SuiteFailed {
        /// Run summary
        summary: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Library error
    #[error("{0}")]
    Probe(#[from] booking_probe::ProbeError),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Logging could not be initialised
    #[error("Logging setup failed: {message}")]
    Logging {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a suite failure
    #[must_use]
    pub fn suite_failed(summary: impl Into<String>) -> Self {
        Self::SuiteFailed {
            summary: summary.into(),
        }
    }

    /// Process exit code: 1 for failing scenarios, 2 for anything else
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::SuiteFailed { .. } => 1,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad config");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad config"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_suite_failed_exit_code() {
        let err = CliError::suite_failed("4/6 passed");
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("4/6 passed"));
    }

    #[test]
    fn test_probe_error_from() {
        let err: CliError = booking_probe::ProbeError::BrowserNotFound.into();
        assert!(err.to_string().contains("CHROMIUM_PATH"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }
}
