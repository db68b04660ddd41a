//! booking-probe CLI library
//!
//! Command-line interface for the booking-site scenario suite.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, ListArgs, ListFormat, RunArgs, SelectArgs,
};
pub use config::{apply_run_flags, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{outcome_line, ProgressListener, ProgressReporter};
