//! CLI command definitions using clap

use booking_probe::{Group, Selection};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// booking-probe: end-to-end browser scenarios for the Shady Meadows B&B site
#[derive(Parser, Debug)]
#[command(name = "booking-probe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file (default: booking-probe.yaml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios and write the HTML report
    Run(RunArgs),

    /// List scenarios in the catalog
    List(ListArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Scenario selection shared by `run` and `list`
#[derive(Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Only scenarios whose id contains this text (repeatable)
    #[arg(short, long)]
    pub filter: Vec<String>,

    /// Only scenarios in this group (repeatable)
    #[arg(short, long)]
    pub group: Vec<Group>,
}

impl SelectArgs {
    /// Selection these flags describe
    #[must_use]
    pub fn selection(&self) -> Selection {
        let selection = self
            .filter
            .iter()
            .fold(Selection::all(), |s, f| s.with_filter(f.clone()));
        self.group.iter().fold(selection, |s, g| s.with_group(*g))
    }
}

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Scenario selection
    #[command(flatten)]
    pub select: SelectArgs,

    /// Site under test
    #[arg(long)]
    pub base_url: Option<String>,

    /// Scenarios run at once
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Run against the in-process simulated site instead of a browser
    #[arg(long)]
    pub simulate: bool,

    /// Directory for the HTML report
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Directory for failure screenshots
    #[arg(long)]
    pub screenshot_dir: Option<PathBuf>,

    /// Skip junit.xml
    #[arg(long)]
    pub no_junit: bool,
}

/// Arguments for the list command
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Scenario selection
    #[command(flatten)]
    pub select: SelectArgs,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ListFormat,
}

/// Output format of the list command
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListFormat {
    /// One scenario per line
    #[default]
    Text,
    /// JSON array
    Json,
}

/// Arguments for the config command
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Print built-in defaults instead of the effective configuration
    #[arg(long)]
    pub defaults: bool,

    /// Only validate; print nothing on success
    #[arg(long)]
    pub check: bool,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Auto-detect
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_run_flags() {
            let cli = Cli::try_parse_from([
                "booking-probe",
                "run",
                "--simulate",
                "--jobs",
                "3",
                "--group",
                "smoke",
                "--group",
                "Booking",
                "--filter",
                "calendar",
                "--base-url",
                "https://staging.test/",
            ])
            .unwrap();
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert!(args.simulate);
            assert_eq!(args.jobs, Some(3));
            assert_eq!(args.select.group, vec![Group::Smoke, Group::Booking]);
            assert_eq!(args.select.filter, vec!["calendar".to_string()]);
            assert_eq!(args.base_url.as_deref(), Some("https://staging.test/"));
        }

        #[test]
        fn test_unknown_group_rejected() {
            let result = Cli::try_parse_from(["booking-probe", "run", "--group", "nightly"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_global_flags_after_subcommand() {
            let cli = Cli::try_parse_from(["booking-probe", "list", "-vv", "--json-logs"]).unwrap();
            assert_eq!(cli.verbose, 2);
            assert!(cli.json_logs);
        }

        #[test]
        fn test_subcommand_required() {
            assert!(Cli::try_parse_from(["booking-probe"]).is_err());
        }
    }

    mod selection_tests {
        use super::*;

        #[test]
        fn test_empty_selects_all() {
            assert_eq!(SelectArgs::default().selection(), Selection::all());
        }

        #[test]
        fn test_flags_become_selection() {
            let args = SelectArgs {
                filter: vec!["book".into()],
                group: vec![Group::Regression],
            };
            let expected = Selection::all()
                .with_filter("book")
                .with_group(Group::Regression);
            assert_eq!(args.selection(), expected);
        }
    }
}
