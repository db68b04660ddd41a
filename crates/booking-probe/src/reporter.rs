//! Reporter - HTML and JUnit output for a suite run.
//!
//! [`HtmlReportListener`] observes the runner and, when the suite finishes,
//! writes `BookingReport_<yyyyMMdd_HHmmss>.html` (plus `junit.xml` when
//! enabled) into the report directory. Failure screenshots are linked by a
//! path relative to the report, so the directory can be archived as a unit.

use crate::artifacts::{relative_to, report_path, to_url_path};
use crate::config::OutputSettings;
use crate::result::ProbeResult;
use crate::runner::{ScenarioListener, ScenarioOutcome, ScenarioStatus, SuiteInfo, SuiteReport};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Framework name shown in the report's system info
pub const FRAMEWORK: &str = concat!("booking-probe ", env!("CARGO_PKG_VERSION"));

/// Writes the HTML (and optionally JUnit) report when the suite finishes
#[derive(Debug, Clone)]
pub struct HtmlReportListener {
    report_dir: PathBuf,
    junit: bool,
    written: Vec<PathBuf>,
}

impl HtmlReportListener {
    /// Listener writing into `report_dir`
    #[must_use]
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
            junit: true,
            written: Vec::new(),
        }
    }

    /// Listener configured from the output settings
    #[must_use]
    pub fn from_settings(output: &OutputSettings) -> Self {
        Self::new(output.report_dir.clone()).with_junit(output.junit)
    }

    /// Enable or disable `junit.xml`
    #[must_use]
    pub const fn with_junit(mut self, junit: bool) -> Self {
        self.junit = junit;
        self
    }

    /// Files written by the last finished suite
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Write the report files for `report`
    pub fn write(&mut self, report: &SuiteReport) -> ProbeResult<PathBuf> {
        std::fs::create_dir_all(&self.report_dir)?;
        let html_path = report_path(&self.report_dir, report.info.started_at);
        std::fs::write(&html_path, render_html(report, &self.report_dir))?;
        tracing::info!(path = %html_path.display(), "report written");
        self.written = vec![html_path.clone()];

        if self.junit {
            let junit_path = self.report_dir.join("junit.xml");
            std::fs::write(&junit_path, render_junit(report))?;
            tracing::info!(path = %junit_path.display(), "junit written");
            self.written.push(junit_path);
        }
        Ok(html_path)
    }
}

impl ScenarioListener for HtmlReportListener {
    fn on_suite_start(&mut self, _info: &SuiteInfo) -> ProbeResult<()> {
        self.written.clear();
        Ok(())
    }

    fn on_suite_finish(&mut self, report: &SuiteReport) -> ProbeResult<()> {
        let _ = self.write(report)?;
        Ok(())
    }
}

const STYLE: &str = r"
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }
        .summary { background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .progress-bar { background: #ddd; height: 20px; border-radius: 10px; overflow: hidden; }
        .passed { background: #4caf50; height: 100%; }
        .system td { padding: 2px 12px 2px 0; }
        .test { padding: 10px; margin: 5px 0; border-radius: 4px; }
        .test.pass { background: #e8f5e9; border-left: 4px solid #4caf50; }
        .test.fail { background: #ffebee; border-left: 4px solid #f44336; }
        .test.skip { background: #fff3e0; border-left: 4px solid #ff9800; }
        .category { display: inline-block; background: #e0e0e0; border-radius: 3px; padding: 0 6px; margin-right: 4px; font-size: 0.85em; }
        .error { color: #d32f2f; font-family: monospace; white-space: pre-wrap; }
        .cause { color: #795548; font-family: monospace; white-space: pre-wrap; margin-left: 1em; }
        .screenshot img { max-width: 480px; border: 1px solid #ddd; margin-top: 8px; }
";

/// Render the HTML report; screenshot links are relative to `report_dir`
#[must_use]
pub fn render_html(report: &SuiteReport, report_dir: &Path) -> String {
    let mut html = String::new();
    let info = &report.info;
    let rate = report.pass_rate() * 100.0;

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Booking Test Report</title>
    <style>{STYLE}    </style>
</head>
<body>
"#
    );

    let _ = write!(
        html,
        r#"<div class="summary">
    <h1>Shady Meadows Booking Report</h1>
    <h2>Results: {}/{} passed ({:.1}%)</h2>
    <div class="progress-bar">
        <div class="passed" style="width: {:.1}%"></div>
    </div>
    <p>Failed: {} &middot; Skipped: {} &middot; Duration: {:.2}s</p>
    <table class="system">
        <tr><td>Application URL</td><td>{}</td></tr>
        <tr><td>Browser</td><td>{}</td></tr>
        <tr><td>Framework</td><td>{}</td></tr>
        <tr><td>Run</td><td>{}</td></tr>
        <tr><td>Started</td><td>{}</td></tr>
    </table>
</div>
"#,
        report.passed_count(),
        report.total_count(),
        rate,
        rate,
        report.failed_count(),
        report.skipped_count(),
        report.duration.as_secs_f64(),
        escape_xml(&info.base_url),
        escape_xml(&info.browser_mode),
        FRAMEWORK,
        info.run_id,
        info.started_at.format("%Y-%m-%d %H:%M:%S"),
    );

    html.push_str("<h2>Scenarios</h2>\n");
    for outcome in &report.outcomes {
        render_outcome(&mut html, outcome, report_dir);
    }

    html.push_str(
        r"
<footer>
    <p>Generated by booking-probe</p>
</footer>
</body>
</html>
",
    );
    html
}

fn render_outcome(html: &mut String, outcome: &ScenarioOutcome, report_dir: &Path) {
    let class = match outcome.status {
        ScenarioStatus::Passed => "pass",
        ScenarioStatus::Failed => "fail",
        ScenarioStatus::Skipped => "skip",
    };
    let categories: String = outcome
        .groups
        .iter()
        .map(|g| format!(r#"<span class="category">{g}</span>"#))
        .collect();

    let _ = write!(
        html,
        r#"<div class="test {class}" id="{}">
    <strong>{}</strong> - {:?} ({:.2}ms)
    <div>{categories} <code>{}</code></div>
"#,
        escape_xml(&outcome.id),
        escape_xml(&outcome.description),
        outcome.status,
        outcome.duration.as_secs_f64() * 1000.0,
        escape_xml(&outcome.id),
    );

    if let Some(error) = &outcome.error {
        let _ = writeln!(html, r#"    <div class="error">{}</div>"#, escape_xml(error));
    }
    for cause in &outcome.causes {
        let _ = writeln!(html, r#"    <div class="cause">caused by: {}</div>"#, escape_xml(cause));
    }
    if let Some(shot) = &outcome.screenshot {
        let src = to_url_path(&relative_to(report_dir, shot));
        let _ = writeln!(
            html,
            r#"    <div class="screenshot"><img src="{}" alt="{} failure"></div>"#,
            escape_xml(&src),
            escape_xml(&outcome.id)
        );
    }
    html.push_str("</div>\n");
}

/// Render JUnit XML content
#[must_use]
pub fn render_junit(report: &SuiteReport) -> String {
    let mut xml = String::new();

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    let _ = writeln!(
        xml,
        r#"<testsuite name="booking-probe" tests="{}" failures="{}" skipped="{}" time="{:.3}" timestamp="{}">"#,
        report.total_count(),
        report.failed_count(),
        report.skipped_count(),
        report.duration.as_secs_f64(),
        report.info.started_at.format("%Y-%m-%dT%H:%M:%S"),
    );

    for outcome in &report.outcomes {
        let _ = writeln!(
            xml,
            r#"  <testcase name="{}" classname="{}" time="{:.3}">"#,
            escape_xml(&outcome.id),
            escape_xml(&classname(outcome)),
            outcome.duration.as_secs_f64()
        );

        let message = outcome.error.as_deref().unwrap_or_default();
        match outcome.status {
            ScenarioStatus::Passed => {}
            ScenarioStatus::Failed => {
                let mut body = message.to_string();
                for cause in &outcome.causes {
                    let _ = write!(body, "\ncaused by: {cause}");
                }
                let _ = writeln!(
                    xml,
                    r#"    <failure message="{}">{}</failure>"#,
                    escape_xml(message),
                    escape_xml(&body)
                );
            }
            ScenarioStatus::Skipped => {
                let _ = writeln!(xml, r#"    <skipped message="{}"/>"#, escape_xml(message));
            }
        }
        if let Some(shot) = &outcome.screenshot {
            let _ = writeln!(
                xml,
                "    <system-out>[[ATTACHMENT|{}]]</system-out>",
                escape_xml(&shot.display().to_string())
            );
        }

        xml.push_str("  </testcase>\n");
    }

    xml.push_str("</testsuite>\n");
    xml
}

/// Groups joined with dots, e.g. `booking.Regression.Booking`
fn classname(outcome: &ScenarioOutcome) -> String {
    std::iter::once("booking".to_string())
        .chain(outcome.groups.iter().map(ToString::to_string))
        .collect::<Vec<_>>()
        .join(".")
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Group;
    use chrono::{Local, TimeZone};
    use std::time::Duration;
    use uuid::Uuid;

    fn outcome(id: &str, status: ScenarioStatus) -> ScenarioOutcome {
        ScenarioOutcome {
            id: id.to_string(),
            description: format!("{id} <desc>"),
            groups: vec![Group::Regression, Group::Booking],
            status,
            duration: Duration::from_millis(1250),
            error: None,
            causes: Vec::new(),
            screenshot: None,
            started_at: Local::now(),
        }
    }

    fn report(outcomes: Vec<ScenarioOutcome>) -> SuiteReport {
        SuiteReport {
            info: SuiteInfo {
                run_id: Uuid::nil(),
                base_url: "https://automationintesting.online/".into(),
                browser_mode: "chromium (headless)".into(),
                scenario_count: outcomes.len(),
                started_at: Local.with_ymd_and_hms(2026, 10, 17, 14, 30, 0).unwrap(),
            },
            outcomes,
            duration: Duration::from_secs(3),
        }
    }

    fn failing() -> ScenarioOutcome {
        let mut failed = outcome("TC_Book_Room_Success", ScenarioStatus::Failed);
        failed.error = Some("Assertion failed: total: expected '£600' to contain '640'".into());
        failed.causes = vec!["inner cause".into()];
        failed.screenshot = Some(PathBuf::from("target/screenshots/20261017_143001_TC_Book_Room_Success.png"));
        failed
    }

    mod html_tests {
        use super::*;

        #[test]
        fn test_html_has_system_info_and_entries() {
            let report = report(vec![outcome("TC_Home_Page_Loads", ScenarioStatus::Passed), failing()]);
            let html = render_html(&report, Path::new("target/reports"));
            assert!(html.contains("Results: 1/2 passed (50.0%)"));
            assert!(html.contains("<td>Application URL</td><td>https://automationintesting.online/</td>"));
            assert!(html.contains("<td>Browser</td><td>chromium (headless)</td>"));
            assert!(html.contains(FRAMEWORK));
            assert!(html.contains("TC_Home_Page_Loads &lt;desc&gt;"));
            assert!(html.contains(r#"<span class="category">Booking</span>"#));
            assert!(html.contains("caused by: inner cause"));
            assert!(html.contains(
                r#"<img src="../screenshots/20261017_143001_TC_Book_Room_Success.png""#
            ));
        }

        #[test]
        fn test_skip_class() {
            let report = report(vec![outcome("TC_S", ScenarioStatus::Skipped)]);
            assert!(render_html(&report, Path::new("r")).contains(r#"class="test skip""#));
        }
    }

    mod junit_tests {
        use super::*;

        #[test]
        fn test_junit_counts_and_failure() {
            let report = report(vec![
                outcome("TC_Home_Page_Loads", ScenarioStatus::Passed),
                failing(),
                outcome("TC_Skip", ScenarioStatus::Skipped),
            ]);
            let xml = render_junit(&report);
            assert!(xml.contains(r#"tests="3" failures="1" skipped="1""#));
            assert!(xml.contains(r#"classname="booking.Regression.Booking""#));
            assert!(xml.contains("expected &apos;£600&apos; to contain &apos;640&apos;\ncaused by: inner cause</failure>"));
            assert!(xml.contains(r#"<skipped message=""/>"#));
            assert!(xml.contains("[[ATTACHMENT|target/screenshots/"));
        }

        #[test]
        fn test_escape_xml() {
            assert_eq!(escape_xml("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
        }
    }

    mod listener_tests {
        use super::*;

        #[test]
        fn test_writes_timestamped_report_and_junit() {
            let dir = tempfile::tempdir().unwrap();
            let mut listener = HtmlReportListener::new(dir.path().join("reports"));
            let report = report(vec![outcome("TC_Home_Page_Loads", ScenarioStatus::Passed)]);
            listener.on_suite_start(&report.info).unwrap();
            listener.on_suite_finish(&report).unwrap();

            let html = dir.path().join("reports/BookingReport_20261017_143000.html");
            assert!(html.exists());
            assert!(dir.path().join("reports/junit.xml").exists());
            assert_eq!(listener.written().len(), 2);
        }

        #[test]
        fn test_junit_can_be_disabled() {
            let dir = tempfile::tempdir().unwrap();
            let mut listener = HtmlReportListener::new(dir.path()).with_junit(false);
            let report = report(Vec::new());
            let path = listener.write(&report).unwrap();
            assert!(path.exists());
            assert!(!dir.path().join("junit.xml").exists());
        }
    }
}
