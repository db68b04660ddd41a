//! Command handlers, one module per subcommand

pub mod config;
pub mod list;
pub mod run;

pub use config::execute_config;
pub use list::{execute_list, ScenarioEntry};
pub use run::{build_runner, execute_run, suite_config, written_report};
