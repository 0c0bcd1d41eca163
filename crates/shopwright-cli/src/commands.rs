//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use shopwright::ReportFormat;
use std::path::PathBuf;

/// Shopwright: page-object scenarios for the Demoblaze storefront
#[derive(Parser, Debug)]
#[command(name = "shopwright")]
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

    /// Log output format
    #[arg(long, default_value = "text", global = true, env = "SHOPWRIGHT_LOG_FORMAT")]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scenario suite
    Run(RunArgs),

    /// List scenarios with their epic, feature and severity
    List(ListArgs),

    /// Show the effective configuration as YAML
    Config(ConfigArgs),
}

/// Configuration file plus command-line overrides
#[derive(Args, Debug, Clone, Default)]
pub struct SuiteArgs {
    /// YAML configuration file
    #[arg(short, long, env = "SHOPWRIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Storefront base URL
    #[arg(long, env = "SHOPWRIGHT_BASE_URL")]
    pub base_url: Option<String>,

    /// Run the browser without a window
    #[arg(long, env = "SHOPWRIGHT_HEADLESS")]
    pub headless: bool,

    /// Explicit wait timeout in seconds
    #[arg(long, env = "SHOPWRIGHT_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Retries per failed scenario
    #[arg(long, env = "SHOPWRIGHT_RETRIES")]
    pub retries: Option<u32>,

    /// Scenarios run at once, each with its own browser
    #[arg(short = 'j', long, env = "SHOPWRIGHT_THREADS")]
    pub threads: Option<usize>,

    /// Directory for reports
    #[arg(long, env = "SHOPWRIGHT_REPORT_DIR")]
    pub report_dir: Option<PathBuf>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Configuration and overrides
    #[command(flatten)]
    pub suite: SuiteArgs,

    /// Browser driver
    #[arg(long, default_value = "simulated", env = "SHOPWRIGHT_DRIVER")]
    pub driver: DriverArg,

    /// Only run scenarios whose name or feature contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Report formats to write
    #[arg(long, default_value = "all")]
    pub format: ReportFormatArg,

    /// Stop scheduling scenarios after the first failure
    #[arg(long)]
    pub fail_fast: bool,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only list scenarios whose name or feature contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Configuration and overrides
    #[command(flatten)]
    pub suite: SuiteArgs,
}

/// Browser driver choice
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DriverArg {
    /// In-memory storefront model
    #[default]
    Simulated,
    /// Real Chromium over CDP (feature `browser`)
    Chromium,
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormatArg {
    /// HTML report
    Html,
    /// JUnit XML
    Junit,
    /// JSON
    Json,
    /// Every format
    #[default]
    All,
}

impl ReportFormatArg {
    /// Formats to write
    #[must_use]
    pub fn formats(self) -> Vec<ReportFormat> {
        match self {
            Self::Html => vec![ReportFormat::Html],
            Self::Junit => vec![ReportFormat::Junit],
            Self::Json => vec![ReportFormat::Json],
            Self::All => ReportFormat::ALL.to_vec(),
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
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

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_command_definition_is_valid() {
            Cli::command().debug_assert();
        }

        #[test]
        fn test_run_defaults() {
            let cli = Cli::try_parse_from(["shopwright", "run"]).unwrap();
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.format, ReportFormatArg::All);
            assert!(!args.fail_fast);
            assert!(args.filter.is_none());
        }

        #[test]
        fn test_run_overrides() {
            let cli = Cli::try_parse_from([
                "shopwright",
                "-vv",
                "run",
                "--driver",
                "simulated",
                "--filter",
                "profile",
                "--timeout",
                "3",
                "--retries",
                "2",
                "-j",
                "4",
                "--format",
                "junit",
                "--fail-fast",
            ])
            .unwrap();
            assert_eq!(cli.verbose, 2);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.driver, DriverArg::Simulated);
            assert_eq!(args.filter.as_deref(), Some("profile"));
            assert_eq!(args.suite.timeout, Some(3));
            assert_eq!(args.suite.retries, Some(2));
            assert_eq!(args.suite.threads, Some(4));
            assert_eq!(args.format.formats(), vec![ReportFormat::Junit]);
            assert!(args.fail_fast);
        }

        #[test]
        fn test_unknown_driver_rejected() {
            assert!(Cli::try_parse_from(["shopwright", "run", "--driver", "firefox"]).is_err());
        }

        #[test]
        fn test_subcommand_required() {
            assert!(Cli::try_parse_from(["shopwright"]).is_err());
        }
    }

    mod format_tests {
        use super::*;

        #[test]
        fn test_all_formats() {
            assert_eq!(ReportFormatArg::All.formats().len(), 3);
            assert_eq!(ReportFormatArg::Html.formats(), vec![ReportFormat::Html]);
        }
    }
}
