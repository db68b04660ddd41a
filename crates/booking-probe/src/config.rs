//! Suite configuration.
//!
//! Loaded from YAML (`booking-probe.yaml`); every field has a default so an
//! empty file is a valid configuration. `BOOKING_PROBE_BASE_URL` overrides
//! the target URL.

use crate::constants::HOME_PAGE_URL;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`SuiteConfig::base_url`]
pub const BASE_URL_ENV: &str = "BOOKING_PROBE_BASE_URL";

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "booking-probe.yaml";

/// Browser launch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run without a visible window
    pub headless: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chromium_path: None,
            sandbox: true,
            viewport_width: 1920,
            viewport_height: 1080,
        }
    }
}

/// Timeouts, all in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Element auto-wait
    pub element_ms: u64,
    /// Page navigation
    pub navigation_ms: u64,
    /// Whole scenario
    pub scenario_ms: u64,
    /// Poll interval for every wait
    pub poll_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element_ms: 5_000,
            navigation_ms: 30_000,
            scenario_ms: 180_000,
            poll_ms: 50,
        }
    }
}

impl Timeouts {
    /// Wait options for element waits
    #[must_use]
    pub const fn element_wait(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.element_ms,
            poll_interval_ms: self.poll_ms,
        }
    }

    /// Wait options for navigation waits
    #[must_use]
    pub const fn navigation_wait(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.navigation_ms,
            poll_interval_ms: self.poll_ms,
        }
    }
}

/// Where artifacts go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// HTML report directory
    pub report_dir: PathBuf,
    /// Failure screenshot directory
    pub screenshot_dir: PathBuf,
    /// Also write `junit.xml` next to the HTML report
    pub junit: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            report_dir: PathBuf::from("target/reports"),
            screenshot_dir: PathBuf::from("target/screenshots"),
            junit: true,
        }
    }
}

/// Calendar paging settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Page clicks allowed before navigation is a failure
    pub max_steps: usize,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self { max_steps: 30 }
    }
}

/// Complete suite configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Entry page of the site under test
    pub base_url: String,
    /// Browser settings
    pub browser: BrowserSettings,
    /// Timeouts
    pub timeouts: Timeouts,
    /// Artifact locations
    pub output: OutputSettings,
    /// Scenarios run concurrently
    pub jobs: usize,
    /// Calendar settings
    pub calendar: CalendarSettings,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: HOME_PAGE_URL.to_string(),
            browser: BrowserSettings::default(),
            timeouts: Timeouts::default(),
            output: OutputSettings::default(),
            jobs: 1,
            calendar: CalendarSettings::default(),
        }
    }
}

impl SuiteConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a YAML string
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load from a YAML file
    pub fn from_yaml_file(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ProbeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// [`SuiteConfig::read`] followed by [`SuiteConfig::validate`]
    pub fn load(path: Option<&Path>) -> ProbeResult<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path` if given, else `booking-probe.yaml` when present, else
    /// defaults; then apply environment overrides. Not validated, so
    /// callers can layer further overrides first.
    pub fn read(path: Option<&Path>) -> ProbeResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_yaml_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_yaml_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.base_url = url;
            }
        }
    }

    /// Reject configurations the runner cannot honour
    pub fn validate(&self) -> ProbeResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ProbeError::config("base_url must not be empty"));
        }
        if self.jobs == 0 {
            return Err(ProbeError::config("jobs must be at least 1"));
        }
        if self.timeouts.element_ms == 0
            || self.timeouts.navigation_ms == 0
            || self.timeouts.scenario_ms == 0
            || self.timeouts.poll_ms == 0
        {
            return Err(ProbeError::config("timeouts must be non-zero"));
        }
        if self.calendar.max_steps == 0 {
            return Err(ProbeError::config("calendar.max_steps must be at least 1"));
        }
        Ok(())
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the job count
    #[must_use]
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.browser.headless = headless;
        self
    }

    /// Set the report directory; screenshots go to a `screenshots` sibling
    #[must_use]
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        self.output.report_dir = root.join("reports");
        self.output.screenshot_dir = root.join("screenshots");
        self
    }

    /// Set all timeouts at once
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SuiteConfig::default();
        assert_eq!(config.base_url, "https://automationintesting.online/");
        assert_eq!(config.jobs, 1);
        assert_eq!(config.calendar.max_steps, 30);
        assert!(config.browser.headless);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(SuiteConfig::from_yaml_str("").unwrap(), SuiteConfig::default());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = "jobs: 3\ntimeouts:\n  element_ms: 250\ncalendar:\n  max_steps: 12\n";
        let config = SuiteConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.jobs, 3);
        assert_eq!(config.timeouts.element_ms, 250);
        assert_eq!(config.timeouts.navigation_ms, 30_000);
        assert_eq!(config.calendar.max_steps, 12);
        assert_eq!(config.base_url, HOME_PAGE_URL);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let err = SuiteConfig::from_yaml_str("jobs: [not a number").unwrap_err();
        assert!(matches!(err, ProbeError::Yaml(_)));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert!(SuiteConfig::default().with_jobs(0).validate().is_err());
        assert!(SuiteConfig::default().with_base_url(" ").validate().is_err());

        let mut config = SuiteConfig::default();
        config.calendar.max_steps = 0;
        assert!(config.validate().is_err());

        let mut config = SuiteConfig::default();
        config.timeouts.scenario_ms = 0;
        assert!(config.validate().is_err());

        let mut config = SuiteConfig::default();
        config.timeouts.poll_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeouts must be non-zero"));
    }

    #[test]
    fn test_read_defers_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.yaml");
        std::fs::write(&path, "jobs: 0\n").unwrap();
        let config = SuiteConfig::read(Some(&path)).unwrap();
        assert_eq!(config.jobs, 0);
        assert!(SuiteConfig::load(Some(&path)).is_err());
        assert!(config.with_jobs(2).validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.yaml");
        let config = SuiteConfig::default().with_jobs(4).with_headless(false);
        std::fs::write(&path, config.to_yaml().unwrap()).unwrap();
        assert_eq!(SuiteConfig::from_yaml_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = SuiteConfig::from_yaml_file(Path::new("/nonexistent/probe.yaml")).unwrap_err();
        assert!(matches!(err, ProbeError::ConfigRead { ref path, .. } if path.ends_with("probe.yaml")));
    }

    #[test]
    fn test_output_root() {
        let config = SuiteConfig::default().with_output_root("/tmp/run");
        assert_eq!(config.output.report_dir, PathBuf::from("/tmp/run/reports"));
        assert_eq!(config.output.screenshot_dir, PathBuf::from("/tmp/run/screenshots"));
    }
}
