//! CLI configuration and suite configuration loading

use crate::commands::SuiteArgs;
use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use shopwright::SuiteConfig;
use std::collections::BTreeMap;
use std::path::Path;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - minimal output
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// From the `-q` flag and the `-v` count
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Default `tracing` filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info,shopwright=info",
            Self::Debug => "debug,shopwright=trace",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogFormat {
    /// Human-readable
    #[default]
    Text,
    /// JSON lines
    Json,
}

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Log line format
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set log format
    #[must_use]
    pub const fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }
}

/// Parse `key=value` lines; `#` and `!` start comments
#[must_use]
pub fn parse_properties(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let (key, value) = line.split_once('=').or_else(|| line.split_once(':'))?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Read a `.properties` or YAML configuration file
///
/// # Errors
///
/// Returns error if the file cannot be read, parsed or validated
pub fn load_file(path: &Path) -> CliResult<SuiteConfig> {
    if !path.exists() {
        return Err(CliError::config(format!(
            "configuration file not found: {}",
            path.display()
        )));
    }
    let is_properties = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("properties"));
    let config = if is_properties {
        let text = std::fs::read_to_string(path)?;
        SuiteConfig::from_properties(&parse_properties(&text))?
    } else {
        SuiteConfig::load(path)?
    };
    Ok(config)
}

/// Load the configuration file (if any) and apply command-line overrides.
///
/// # Errors
///
/// Returns error if the file is invalid or the overridden result fails
/// validation
pub fn resolve_suite_config(args: &SuiteArgs) -> CliResult<SuiteConfig> {
    let mut config = match &args.config {
        Some(path) => load_file(path)?,
        None => SuiteConfig::default(),
    };
    if let Some(url) = &args.base_url {
        config = config.with_base_url(url.clone());
    }
    if args.headless {
        config = config.with_headless(true);
    }
    if let Some(seconds) = args.timeout {
        config = config.with_timeout_seconds(seconds);
    }
    if let Some(retries) = args.retries {
        config = config.with_retry_count(retries);
    }
    if let Some(threads) = args.threads {
        config = config.with_thread_count(threads);
    }
    if let Some(dir) = &args.report_dir {
        config = config
            .with_screenshot_dir(dir.join("screenshots"))
            .with_report_dir(dir.clone());
    }
    config
        .validate()
        .map_err(|e| CliError::invalid_argument(e.to_string()))?;
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    mod verbosity_tests {
        use super::*;

        #[test]
        fn test_from_flags() {
            assert_eq!(Verbosity::from_flags(true, 3), Verbosity::Quiet);
            assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
            assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
            assert_eq!(Verbosity::from_flags(false, 5), Verbosity::Debug);
        }

        #[test]
        fn test_is_verbose() {
            assert!(!Verbosity::Normal.is_verbose());
            assert!(Verbosity::Verbose.is_verbose());
            assert!(Verbosity::Debug.is_verbose());
            assert!(Verbosity::Quiet.is_quiet());
        }

        #[test]
        fn test_log_filter() {
            assert_eq!(Verbosity::Quiet.log_filter(), "error");
            assert!(Verbosity::Debug.log_filter().contains("trace"));
        }
    }

    mod color_tests {
        use super::*;

        #[test]
        fn test_explicit_choices() {
            assert!(ColorChoice::Always.should_color());
            assert!(!ColorChoice::Never.should_color());
        }
    }

    mod properties_tests {
        use super::*;

        #[test]
        fn test_parse_properties() {
            let props = parse_properties(
                "# comment\nbase.url = https://demo.test/\n\n! other comment\nretry.count=2\nheadless: true\n",
            );
            assert_eq!(props.get("base.url").map(String::as_str), Some("https://demo.test/"));
            assert_eq!(props.get("retry.count").map(String::as_str), Some("2"));
            assert_eq!(props.get("headless").map(String::as_str), Some("true"));
            assert_eq!(props.len(), 3);
        }

        #[test]
        fn test_load_properties_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.properties");
            std::fs::write(&path, "base.url=https://demo.test/\nthread.count=3\n").unwrap();
            let config = load_file(&path).unwrap();
            assert_eq!(config.base_url, "https://demo.test/");
            assert_eq!(config.thread_count, 3);
        }

        #[test]
        fn test_load_yaml_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("shopwright.yaml");
            std::fs::write(&path, "retry_count: 1\nheadless: true\n").unwrap();
            let config = load_file(&path).unwrap();
            assert_eq!(config.retry_count, 1);
            assert!(config.headless);
        }

        #[test]
        fn test_missing_file() {
            let err = load_file(Path::new("/nonexistent/shopwright.yaml")).unwrap_err();
            assert!(matches!(err, CliError::Config { .. }));
        }
    }

    mod overlay_tests {
        use super::*;

        #[test]
        fn test_defaults_without_file() {
            let config = resolve_suite_config(&SuiteArgs::default()).unwrap();
            assert_eq!(config.base_url, shopwright::config::DEFAULT_BASE_URL);
        }

        #[test]
        fn test_flags_override_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("shopwright.yaml");
            std::fs::write(&path, "retry_count: 1\ntimeout_seconds: 20\n").unwrap();
            let args = SuiteArgs {
                config: Some(path),
                base_url: Some("http://localhost:8080/".to_string()),
                headless: true,
                timeout: Some(5),
                retries: None,
                threads: Some(2),
                report_dir: Some(PathBuf::from("out")),
            };
            let config = resolve_suite_config(&args).unwrap();
            assert_eq!(config.base_url, "http://localhost:8080/");
            assert!(config.headless);
            assert_eq!(config.timeout_seconds, 5);
            assert_eq!(config.retry_count, 1);
            assert_eq!(config.thread_count, 2);
            assert_eq!(config.report_dir, PathBuf::from("out"));
            assert_eq!(config.screenshot_dir, PathBuf::from("out/screenshots"));
        }

        #[test]
        fn test_invalid_override() {
            let args = SuiteArgs {
                threads: Some(0),
                ..SuiteArgs::default()
            };
            assert!(matches!(
                resolve_suite_config(&args).unwrap_err(),
                CliError::InvalidArgument { .. }
            ));
        }
    }
}
