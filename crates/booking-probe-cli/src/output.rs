//! Terminal output: progress bar and per-scenario lines

use booking_probe::{
    ProbeResult, Scenario, ScenarioListener, ScenarioOutcome, ScenarioStatus, SuiteInfo,
    SuiteReport,
};
use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter for scenario execution
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Update progress message
    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    fn line(&self, line: &str) {
        match self.progress_bar {
            Some(ref pb) => pb.println(line),
            None => {
                let _ = self.term.write_line(line);
            }
        }
    }

    fn prefixed(&self, symbol: &str, plain: &str, color: Style, message: &str) -> String {
        let prefix = if self.use_color {
            color.apply_to(symbol).bold().to_string()
        } else {
            plain.to_string()
        };
        format!("{prefix} {message}")
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.line(&self.prefixed("✓", "PASS", Style::new().green(), message));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        self.line(&self.prefixed("✗", "FAIL", Style::new().red(), message));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.line(&self.prefixed("⚠", "SKIP", Style::new().yellow(), message));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.line(&self.prefixed("ℹ", "INFO", Style::new().blue(), message));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// Print the suite summary
    pub fn summary(&self, report: &SuiteReport) {
        let failed = report.failed_count();
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");
        let status = if report.all_passed() { "PASSED" } else { "FAILED" };
        let status = if !self.use_color {
            status.to_string()
        } else if report.all_passed() {
            style(status).green().bold().to_string()
        } else {
            style(status).red().bold().to_string()
        };
        let _ = self.term.write_line(&format!("{status} {}", report.summary()));
    }
}

/// One line for a finished scenario
#[must_use]
pub fn outcome_line(outcome: &ScenarioOutcome) -> String {
    let secs = outcome.duration.as_secs_f64();
    match outcome.error {
        Some(ref error) => format!("{} ({secs:.2}s): {error}", outcome.id),
        None => format!("{} ({secs:.2}s)", outcome.id),
    }
}

/// Listener driving a [`ProgressReporter`] from suite events
#[derive(Debug)]
pub struct ProgressListener {
    reporter: ProgressReporter,
}

impl ProgressListener {
    /// Wrap `reporter`
    #[must_use]
    pub const fn new(reporter: ProgressReporter) -> Self {
        Self { reporter }
    }
}

impl ScenarioListener for ProgressListener {
    fn on_suite_start(&mut self, info: &SuiteInfo) -> ProbeResult<()> {
        self.reporter.header(&format!(
            "{} scenarios against {} ({})",
            info.scenario_count, info.base_url, info.browser_mode
        ));
        self.reporter
            .start_progress(info.scenario_count as u64, "starting");
        Ok(())
    }

    fn on_scenario_start(&mut self, scenario: &Scenario) -> ProbeResult<()> {
        self.reporter.set_message(scenario.id);
        Ok(())
    }

    fn on_scenario_finish(&mut self, outcome: &ScenarioOutcome) -> ProbeResult<()> {
        let line = outcome_line(outcome);
        match outcome.status {
            ScenarioStatus::Passed => self.reporter.success(&line),
            ScenarioStatus::Failed => self.reporter.failure(&line),
            ScenarioStatus::Skipped => self.reporter.warning(&line),
        }
        if let Some(ref shot) = outcome.screenshot {
            self.reporter.info(&format!("screenshot: {}", shot.display()));
        }
        self.reporter.increment(1);
        Ok(())
    }

    fn on_suite_finish(&mut self, report: &SuiteReport) -> ProbeResult<()> {
        self.reporter.finish();
        self.reporter.summary(report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_probe::{Group, ProbeError, Session};
    use chrono::Local;
    use futures::future::BoxFuture;
    use std::time::Duration;

    fn noop(_: &Session) -> BoxFuture<'_, ProbeResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn outcome(error: Option<ProbeError>) -> ScenarioOutcome {
        let scenario = Scenario::new("TC_Demo", "demo", &[Group::Smoke], noop);
        let outcome = match error {
            Some(ref e) => ScenarioOutcome::failed(&scenario, Local::now(), e),
            None => ScenarioOutcome::passed(&scenario, Local::now()),
        };
        outcome.with_duration(Duration::from_millis(1500))
    }

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_messages_do_not_panic() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_progress(2, "running");
            reporter.success("passed");
            reporter.failure("failed");
            reporter.warning("skipped");
            reporter.info("note");
            reporter.header("Header");
            reporter.increment(1);
            reporter.finish();
        }
    }

    mod outcome_line_tests {
        use super::*;

        #[test]
        fn test_passed_line() {
            assert_eq!(outcome_line(&outcome(None)), "TC_Demo (1.50s)");
        }

        #[test]
        fn test_failed_line_has_error() {
            let line = outcome_line(&outcome(Some(ProbeError::assertion("bad"))));
            assert_eq!(line, "TC_Demo (1.50s): Assertion failed: bad");
        }
    }
}
