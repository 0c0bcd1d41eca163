//! Shopwright CLI library
//!
//! Command-line interface for running the Shopwright storefront suite.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, DriverArg, ListArgs, LogFormatArg, ReportFormatArg,
    RunArgs, SuiteArgs,
};
pub use config::{
    load_file, parse_properties, resolve_suite_config, CliConfig, ColorChoice, LogFormat,
    Verbosity,
};
pub use error::{CliError, CliResult};
pub use output::{scenario_line, ProgressReporter};
pub use runner::{factory_for, list_scenarios, run_suite, show_config, RunOutcome};
