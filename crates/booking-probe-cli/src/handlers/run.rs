//! Run command handler

use crate::commands::RunArgs;
use crate::config::{apply_run_flags, CliConfig};
use crate::error::{CliError, CliResult};
use crate::output::{ProgressListener, ProgressReporter};
use booking_probe::artifacts::report_path;
use booking_probe::{
    catalog, HtmlReportListener, LoggingListener, ScenarioRunner, SimulatedSessions, SuiteConfig,
    SuiteReport,
};
use std::path::{Path, PathBuf};

/// Read the suite configuration, apply `run` flags, then validate
pub fn suite_config(config_path: Option<&Path>, args: &RunArgs) -> CliResult<SuiteConfig> {
    let config = apply_run_flags(SuiteConfig::read(config_path)?, args);
    config.validate()?;
    Ok(config)
}

#[cfg(feature = "browser")]
fn browser_runner(config: SuiteConfig) -> CliResult<ScenarioRunner> {
    let factory = booking_probe::ChromiumSessions::new(&config.browser);
    Ok(ScenarioRunner::new(config, factory))
}

#[cfg(not(feature = "browser"))]
fn browser_runner(_config: SuiteConfig) -> CliResult<ScenarioRunner> {
    Err(CliError::config(
        "built without the `browser` feature; pass --simulate or rebuild with --features browser",
    ))
}

/// Runner with the session backend, progress output, logging and report
/// listeners `args` ask for
pub fn build_runner(cli: &CliConfig, config: SuiteConfig, args: &RunArgs) -> CliResult<ScenarioRunner> {
    let report = HtmlReportListener::from_settings(&config.output);
    let runner = if args.simulate {
        ScenarioRunner::new(config, SimulatedSessions::new())
    } else {
        browser_runner(config)?
    };
    let progress = ProgressReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());
    Ok(runner
        .with_selection(args.select.selection())
        .with_listener(LoggingListener)
        .with_listener(ProgressListener::new(progress))
        .with_listener(report))
}

/// Run the selected scenarios; a suite with failures is an error
pub fn execute_run(cli: &CliConfig, config_path: Option<&Path>, args: &RunArgs) -> CliResult<SuiteReport> {
    let scenarios = catalog();
    if args.select.selection().apply(&scenarios).is_empty() {
        return Err(CliError::config("no scenario matches the given --filter/--group"));
    }
    let config = suite_config(config_path, args)?;
    let report_dir = config.output.report_dir.clone();
    let mut runner = build_runner(cli, config, args)?;

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(runner.run(&scenarios))?;
    if !cli.verbosity.is_quiet() {
        println!("Report: {}", written_report(&report_dir, &report).display());
    }
    if report.all_passed() {
        Ok(report)
    } else {
        Err(CliError::suite_failed(report.summary()))
    }
}

/// Path the HTML listener wrote for `report`
#[must_use]
pub fn written_report(report_dir: &Path, report: &SuiteReport) -> PathBuf {
    report_path(report_dir, report.info.started_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::SelectArgs;
    use booking_probe::Group;

    fn simulate(root: &Path) -> RunArgs {
        RunArgs {
            simulate: true,
            report_dir: Some(root.join("reports")),
            screenshot_dir: Some(root.join("shots")),
            ..RunArgs::default()
        }
    }

    #[test]
    fn test_suite_config_applies_flags() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("suite.yaml");
        std::fs::write(&file, "jobs: 2\nbase_url: https://file.test/\n").unwrap();
        let args = RunArgs {
            jobs: Some(5),
            ..RunArgs::default()
        };
        let config = suite_config(Some(&file), &args).unwrap();
        assert_eq!(config.jobs, 5);
        assert!(config.base_url.ends_with(".test/"));
    }

    #[test]
    fn test_flags_override_invalid_file_before_validation() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("suite.yaml");
        std::fs::write(&file, "jobs: 0\n").unwrap();
        let args = RunArgs {
            jobs: Some(2),
            ..RunArgs::default()
        };
        assert_eq!(suite_config(Some(&file), &args).unwrap().jobs, 2);
        assert!(suite_config(Some(&file), &RunArgs::default()).is_err());
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let args = RunArgs {
            jobs: Some(0),
            ..RunArgs::default()
        };
        let err = suite_config(None, &args).unwrap_err();
        assert!(err.to_string().contains("jobs"));
    }

    #[test]
    fn test_simulated_smoke_run_writes_report() {
        let tmp = tempfile::tempdir().unwrap();
        let args = RunArgs {
            select: SelectArgs {
                group: vec![Group::Smoke],
                ..SelectArgs::default()
            },
            ..simulate(tmp.path())
        };
        let cli = CliConfig::default().with_verbosity(crate::config::Verbosity::Quiet);
        let report = execute_run(&cli, None, &args).unwrap();
        assert_eq!(report.total_count(), 2);
        assert!(written_report(&tmp.path().join("reports"), &report).exists());
    }

    #[test]
    fn test_empty_selection_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let args = RunArgs {
            select: SelectArgs {
                filter: vec!["no_such_scenario".into()],
                ..SelectArgs::default()
            },
            ..simulate(tmp.path())
        };
        let cli = CliConfig::default().with_verbosity(crate::config::Verbosity::Quiet);
        let err = execute_run(&cli, None, &args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
