//! Result and error types for booking-probe.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for booking-probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving the booking site
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set CHROMIUM_PATH")]
    BrowserNotFound,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Page error
    #[error("Page error: {message}")]
    PageError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// A required element never appeared
    #[error("Element {selector} not found after {ms}ms")]
    ElementNotFound {
        /// Locator description
        selector: String,
        /// Time waited in milliseconds
        ms: u64,
    },

    /// A wait condition did not hold in time
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// What was being waited for
        what: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// An action locator matched more than one element
    #[error("Strict mode violation: {selector} resolved to {count} elements")]
    StrictModeViolation {
        /// Locator description
        selector: String,
        /// Number of matches
        count: usize,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// The calendar scan exhausted every candidate
    #[error("No available date found across {probed} candidate dates")]
    NoAvailableDate {
        /// Number of candidates probed
        probed: usize,
    },

    /// The calendar never reached the requested month
    #[error("Calendar stopped at '{reached}' after {steps} steps while paging to '{target}'")]
    CalendarNavigation {
        /// Label that was requested
        target: String,
        /// Label that was last shown
        reached: String,
        /// Steps taken
        steps: usize,
    },

    /// A month label could not be parsed
    #[error("Unrecognised month label: '{label}'")]
    InvalidMonthLabel {
        /// The offending label
        label: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    ScreenshotError {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// A configuration file could not be read
    #[error("Configuration error: cannot read {}", path.display())]
    ConfigRead {
        /// File that was requested
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::PageError {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this failure came from the environment lacking free dates
    /// rather than from a UI defect
    #[must_use]
    pub const fn is_no_availability(&self) -> bool {
        matches!(self, Self::NoAvailableDate { .. })
    }
}
