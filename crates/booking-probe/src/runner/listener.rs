//! Scenario outcomes and the observers that receive them.

use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{Group, Scenario};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::error::Error as _;
use std::fmt::Debug;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Scenario result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioStatus {
    /// Every check held
    Passed,
    /// A step or check failed
    Failed,
    /// No session could be opened
    Skipped,
}

impl ScenarioStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Lower-case label
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Record of one scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Scenario id
    pub id: String,
    /// Scenario description
    pub description: String,
    /// Report categories
    pub groups: Vec<Group>,
    /// Result
    pub status: ScenarioStatus,
    /// Wall time, session open to close
    pub duration: Duration,
    /// Failure or skip reason
    pub error: Option<String>,
    /// Underlying causes of `error`, outermost first
    pub causes: Vec<String>,
    /// Failure screenshot, if one was saved
    pub screenshot: Option<PathBuf>,
    /// When the scenario started
    pub started_at: DateTime<Local>,
}

impl ScenarioOutcome {
    fn new(scenario: &Scenario, status: ScenarioStatus, started_at: DateTime<Local>) -> Self {
        Self {
            id: scenario.id.to_string(),
            description: scenario.description.to_string(),
            groups: scenario.groups.to_vec(),
            status,
            duration: Duration::ZERO,
            error: None,
            causes: Vec::new(),
            screenshot: None,
            started_at,
        }
    }

    /// A passing outcome
    #[must_use]
    pub fn passed(scenario: &Scenario, started_at: DateTime<Local>) -> Self {
        Self::new(scenario, ScenarioStatus::Passed, started_at)
    }

    /// A failing outcome carrying `error` and its source chain
    #[must_use]
    pub fn failed(scenario: &Scenario, started_at: DateTime<Local>, error: &ProbeError) -> Self {
        Self::new(scenario, ScenarioStatus::Failed, started_at).with_error(error)
    }

    /// A skipped outcome carrying the reason
    #[must_use]
    pub fn skipped(scenario: &Scenario, started_at: DateTime<Local>, error: &ProbeError) -> Self {
        Self::new(scenario, ScenarioStatus::Skipped, started_at).with_error(error)
    }

    fn with_error(mut self, error: &ProbeError) -> Self {
        self.error = Some(error.to_string());
        self.causes = std::iter::successors(error.source(), |e| (*e).source())
            .map(ToString::to_string)
            .collect();
        self
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Attach a screenshot path
    #[must_use]
    pub fn with_screenshot(mut self, path: PathBuf) -> Self {
        self.screenshot = Some(path);
        self
    }
}

/// Facts about a run, known before any scenario starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteInfo {
    /// Unique run id
    pub run_id: Uuid,
    /// Site under test
    pub base_url: String,
    /// Session backend, e.g. "simulated" or "chromium (headless)"
    pub browser_mode: String,
    /// Scenarios selected to run
    pub scenario_count: usize,
    /// When the run started
    pub started_at: DateTime<Local>,
}

/// Merged results of a run, in catalog order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Run facts
    pub info: SuiteInfo,
    /// One outcome per selected scenario
    pub outcomes: Vec<ScenarioOutcome>,
    /// Wall time of the whole run
    pub duration: Duration,
}

impl SuiteReport {
    fn count(&self, status: ScenarioStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Number of passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(ScenarioStatus::Passed)
    }

    /// Number of failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(ScenarioStatus::Failed)
    }

    /// Number of skipped scenarios
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(ScenarioStatus::Skipped)
    }

    /// Total scenario count
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.outcomes.len()
    }

    /// Pass rate (0.0 to 1.0); an empty run counts as passing
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 1.0;
        }
        self.passed_count() as f64 / self.outcomes.len() as f64
    }

    /// No failures and no skips
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_passed())
    }

    /// Outcomes that did not pass
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioOutcome> {
        self.outcomes
            .iter()
            .filter(|o| !o.status.is_passed())
            .collect()
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}/{} passed, {} failed, {} skipped ({:.1}%) in {:.2}s",
            self.passed_count(),
            self.total_count(),
            self.failed_count(),
            self.skipped_count(),
            self.pass_rate() * 100.0,
            self.duration.as_secs_f64()
        )
    }
}

/// Observer of a suite run.
///
/// Called only from the runner task, so implementations need no
/// synchronisation of their own.
pub trait ScenarioListener: Send + Debug {
    /// Before the first scenario starts
    fn on_suite_start(&mut self, _info: &SuiteInfo) -> ProbeResult<()> {
        Ok(())
    }

    /// A scenario obtained its session and began
    fn on_scenario_start(&mut self, _scenario: &Scenario) -> ProbeResult<()> {
        Ok(())
    }

    /// A scenario finished, whatever its status
    fn on_scenario_finish(&mut self, _outcome: &ScenarioOutcome) -> ProbeResult<()> {
        Ok(())
    }

    /// After every scenario finished
    fn on_suite_finish(&mut self, _report: &SuiteReport) -> ProbeResult<()> {
        Ok(())
    }
}

/// Listener that logs every event through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl ScenarioListener for LoggingListener {
    fn on_suite_start(&mut self, info: &SuiteInfo) -> ProbeResult<()> {
        tracing::info!(
            run_id = %info.run_id,
            base_url = %info.base_url,
            mode = %info.browser_mode,
            scenarios = info.scenario_count,
            "suite started"
        );
        Ok(())
    }

    fn on_scenario_start(&mut self, scenario: &Scenario) -> ProbeResult<()> {
        tracing::info!(scenario = scenario.id, "scenario started");
        Ok(())
    }

    fn on_scenario_finish(&mut self, outcome: &ScenarioOutcome) -> ProbeResult<()> {
        match outcome.status {
            ScenarioStatus::Passed => tracing::info!(
                scenario = %outcome.id,
                ms = outcome.duration.as_millis() as u64,
                "scenario passed"
            ),
            ScenarioStatus::Failed => tracing::warn!(
                scenario = %outcome.id,
                error = outcome.error.as_deref().unwrap_or_default(),
                "scenario failed"
            ),
            ScenarioStatus::Skipped => tracing::warn!(
                scenario = %outcome.id,
                reason = outcome.error.as_deref().unwrap_or_default(),
                "scenario skipped"
            ),
        }
        Ok(())
    }

    fn on_suite_finish(&mut self, report: &SuiteReport) -> ProbeResult<()> {
        tracing::info!(run_id = %report.info.run_id, summary = %report.summary(), "suite finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use futures::future::BoxFuture;

    fn noop(_: &Session) -> BoxFuture<'_, ProbeResult<()>> {
        Box::pin(async { Ok(()) })
    }

    const SCENARIO: Scenario = Scenario::new("TC_X", "x", &[Group::Smoke], noop);

    fn report(statuses: &[ScenarioStatus]) -> SuiteReport {
        let now = Local::now();
        let outcomes = statuses
            .iter()
            .map(|s| ScenarioOutcome::new(&SCENARIO, *s, now))
            .collect();
        SuiteReport {
            info: SuiteInfo {
                run_id: Uuid::new_v4(),
                base_url: "https://sim.test/".into(),
                browser_mode: "simulated".into(),
                scenario_count: statuses.len(),
                started_at: now,
            },
            outcomes,
            duration: Duration::from_millis(1500),
        }
    }

    mod status_tests {
        use super::*;

        #[test]
        fn test_status_predicates() {
            assert!(ScenarioStatus::Passed.is_passed());
            assert!(ScenarioStatus::Failed.is_failed());
            assert!(!ScenarioStatus::Skipped.is_passed());
            assert_eq!(ScenarioStatus::Skipped.as_str(), "skipped");
        }
    }

    mod outcome_tests {
        use super::*;

        #[test]
        fn test_failed_outcome_keeps_cause_chain() {
            let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing chromium");
            let error = ProbeError::from(io);
            let outcome = ScenarioOutcome::failed(&SCENARIO, Local::now(), &error);
            assert_eq!(outcome.status, ScenarioStatus::Failed);
            assert_eq!(outcome.error.as_deref(), Some("I/O error: missing chromium"));
            assert_eq!(outcome.causes, vec!["missing chromium".to_string()]);
            assert_eq!(outcome.groups, vec![Group::Smoke]);
        }

        #[test]
        fn test_config_read_failure_records_io_cause() {
            let error = ProbeError::ConfigRead {
                path: "booking-probe.yaml".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            };
            let outcome = ScenarioOutcome::skipped(&SCENARIO, Local::now(), &error);
            assert_eq!(
                outcome.error.as_deref(),
                Some("Configuration error: cannot read booking-probe.yaml")
            );
            assert_eq!(outcome.causes, vec!["no such file".to_string()]);
        }

        #[test]
        fn test_skipped_outcome() {
            let outcome = ScenarioOutcome::skipped(&SCENARIO, Local::now(), &ProbeError::BrowserNotFound)
                .with_duration(Duration::from_millis(3));
            assert_eq!(outcome.status, ScenarioStatus::Skipped);
            assert!(outcome.causes.is_empty());
            assert_eq!(outcome.duration, Duration::from_millis(3));
        }
    }

    mod report_tests {
        use super::*;

        #[test]
        fn test_counts_and_summary() {
            let report = report(&[
                ScenarioStatus::Passed,
                ScenarioStatus::Failed,
                ScenarioStatus::Skipped,
                ScenarioStatus::Passed,
            ]);
            assert_eq!(report.passed_count(), 2);
            assert_eq!(report.failed_count(), 1);
            assert_eq!(report.skipped_count(), 1);
            assert!(!report.all_passed());
            assert_eq!(report.failures().len(), 2);
            assert_eq!(report.summary(), "2/4 passed, 1 failed, 1 skipped (50.0%) in 1.50s");
        }

        #[test]
        fn test_empty_run_passes() {
            let report = report(&[]);
            assert!(report.all_passed());
            assert!((report.pass_rate() - 1.0).abs() < f64::EPSILON);
        }
    }
}
