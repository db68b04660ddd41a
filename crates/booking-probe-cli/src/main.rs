//! booking-probe: run the Shady Meadows B&B browser scenarios
//!
//! ## Usage
//!
//! ```bash
//! booking-probe run                        # Every scenario in headless Chromium
//! booking-probe run --group smoke --headed # Smoke scenarios, visible window
//! booking-probe run --simulate             # Against the in-process site
//! booking-probe list --format json         # Catalog as JSON
//! booking-probe config                     # Effective configuration
//! ```
//!
//! Exit codes: 0 all scenarios passed, 1 some failed, 2 usage or setup error.

use booking_probe_cli::handlers::{execute_config, execute_list, execute_run};
use booking_probe_cli::{logging, Cli, CliConfig, CliResult, Commands, Verbosity};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init(&config)?;
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run(args) => execute_run(&config, config_path, &args).map(|_| ()),
        Commands::List(args) => {
            println!("{}", execute_list(&args)?);
            Ok(())
        }
        Commands::Config(args) => {
            if let Some(yaml) = execute_config(config_path, &args)? {
                print!("{yaml}");
            }
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
        .with_json_logs(cli.json_logs)
}
