//! CLI configuration and flag overrides

use crate::commands::RunArgs;
use booking_probe::SuiteConfig;
use serde::{Deserialize, Serialize};

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - minimal output
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// From `-q` and the `-v` count
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Default log filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stderr().features().colors_supported(),
        }
    }
}

/// CLI presentation settings
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// JSON log lines
    pub json_logs: bool,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set JSON logging
    #[must_use]
    pub const fn with_json_logs(mut self, json_logs: bool) -> Self {
        self.json_logs = json_logs;
        self
    }
}

/// Apply `run` flags on top of a loaded suite configuration
#[must_use]
pub fn apply_run_flags(mut config: SuiteConfig, args: &RunArgs) -> SuiteConfig {
    if let Some(ref url) = args.base_url {
        config.base_url.clone_from(url);
    }
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }
    if args.headed {
        config.browser.headless = false;
    }
    if let Some(ref dir) = args.report_dir {
        config.output.report_dir.clone_from(dir);
    }
    if let Some(ref dir) = args.screenshot_dir {
        config.output.screenshot_dir.clone_from(dir);
    }
    if args.no_junit {
        config.output.junit = false;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    mod verbosity_tests {
        use super::*;

        #[test]
        fn test_from_flags() {
            assert_eq!(Verbosity::from_flags(true, 3), Verbosity::Quiet);
            assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
            assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
            assert_eq!(Verbosity::from_flags(false, 5), Verbosity::Debug);
        }

        #[test]
        fn test_log_filter() {
            assert_eq!(Verbosity::Normal.log_filter(), "warn");
            assert_eq!(Verbosity::Debug.log_filter(), "debug");
        }
    }

    mod color_tests {
        use super::*;

        #[test]
        fn test_explicit_choices() {
            assert!(ColorChoice::Always.should_color());
            assert!(!ColorChoice::Never.should_color());
        }
    }

    mod run_flag_tests {
        use super::*;

        #[test]
        fn test_no_flags_keeps_config() {
            let config = SuiteConfig::default();
            assert_eq!(apply_run_flags(config.clone(), &RunArgs::default()), config);
        }

        #[test]
        fn test_flags_override() {
            let args = RunArgs {
                base_url: Some("https://staging.test/".into()),
                jobs: Some(4),
                headed: true,
                report_dir: Some(PathBuf::from("out/reports")),
                no_junit: true,
                ..RunArgs::default()
            };
            let config = apply_run_flags(SuiteConfig::default(), &args);
            assert_eq!(config.base_url, "https://staging.test/");
            assert_eq!(config.jobs, 4);
            assert!(!config.browser.headless);
            assert_eq!(config.output.report_dir, PathBuf::from("out/reports"));
            assert!(!config.output.junit);
            assert_eq!(config.output.screenshot_dir, PathBuf::from("target/screenshots"));
        }
    }
}
