//! Shopwright CLI: run the Demoblaze storefront scenarios
//!
//! ## Usage
//!
//! ```bash
//! shopwright run                          # Whole suite, simulated driver
//! shopwright run --filter checkout -j 4   # Subset, four sessions at once
//! shopwright run --driver chromium --headless --config shopwright.yaml
//! shopwright list                         # Scenarios with epic/feature/severity
//! shopwright config --config shopwright.properties
//! ```

use clap::Parser;
use shopwright_cli::{
    list_scenarios, logging, run_suite, show_config, Cli, CliConfig, CliError, CliResult,
    ColorChoice, Commands, LogFormat, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init(config.verbosity, config.log_format);

    match cli.command {
        Commands::Run(args) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let outcome = runtime.block_on(run_suite(&config, &args))?;
            if outcome.is_success() {
                Ok(())
            } else {
                Err(CliError::scenario_failure(format!(
                    "{} scenario(s) failed",
                    outcome.failed
                )))
            }
        }
        Commands::List(args) => {
            for line in list_scenarios(&args) {
                println!("{line}");
            }
            Ok(())
        }
        Commands::Config(args) => {
            print!("{}", show_config(&args)?);
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.clone().into();
    let log_format: LogFormat = cli.log_format.into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_log_format(log_format)
}
