//! Command handlers: run the suite, list scenarios, show configuration

use crate::commands::{ConfigArgs, DriverArg, ListArgs, RunArgs};
use crate::config::{resolve_suite_config, CliConfig};
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use shopwright::scenario::matches_filter;
use shopwright::{suite, FailureMode, Reporter, ScenarioRunner, SessionFactory, SimulatedFactory};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Shown when a failure stopped scheduling, whether `--fail-fast` or
/// `continue_on_failure: false` asked for it
const STOPPED_EARLY: &str = "stopped after the first failure; remaining scenarios were skipped";

/// Result of a suite run
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    /// Passed scenarios
    pub passed: usize,
    /// Failed scenarios
    pub failed: usize,
    /// Skipped scenarios
    pub skipped: usize,
    /// Whether a failure stopped scheduling
    pub stopped_early: bool,
    /// Report files written
    pub reports: Vec<PathBuf>,
}

impl RunOutcome {
    /// Whether every executed scenario passed
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Session factory for the chosen driver
///
/// # Errors
///
/// Returns error when the chromium driver is requested without the `browser`
/// feature
pub fn factory_for(driver: DriverArg) -> CliResult<Arc<dyn SessionFactory>> {
    match driver {
        DriverArg::Simulated => Ok(Arc::new(SimulatedFactory::new())),
        #[cfg(feature = "browser")]
        DriverArg::Chromium => Ok(Arc::new(shopwright::ChromiumFactory)),
        #[cfg(not(feature = "browser"))]
        DriverArg::Chromium => Err(CliError::invalid_argument(
            "the chromium driver needs a build with --features browser",
        )),
    }
}

/// Run the built-in suite and write reports
///
/// # Errors
///
/// Returns error for invalid configuration or when reports cannot be written.
/// Failing scenarios are not an error here; see [`RunOutcome::is_success`].
pub async fn run_suite(cli: &CliConfig, args: &RunArgs) -> CliResult<RunOutcome> {
    let config = resolve_suite_config(&args.suite)?;
    let factory = factory_for(args.driver)?;
    let failure_mode = if args.fail_fast {
        FailureMode::StopOnFirst
    } else {
        FailureMode::from_continue(config.continue_on_failure)
    };

    let scenarios = suite::builtin();
    let mut progress = ProgressReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());
    progress.header("Shopwright");
    progress.info(&format!(
        "driver {}, {} scenarios, {} thread(s), base URL {}",
        factory.name(),
        scenarios.len(),
        config.thread_count,
        config.base_url
    ));
    progress.start_progress(scenarios.len() as u64, "Running scenarios");

    let report_dir = config.report_dir.clone();
    let runner = ScenarioRunner::new(config, factory).with_filter(args.filter.clone());
    let mut reporter = Reporter::new().with_failure_mode(failure_mode);
    let started = Instant::now();
    let summary = runner
        .run_with(&scenarios, &mut reporter, |event| progress.on_event(event))
        .await;
    progress.finish();

    let reports = reporter
        .write_all(&report_dir, &args.format.formats())
        .map_err(|e| CliError::report_generation(e.to_string()))?;
    for path in &reports {
        progress.info(&format!("report written: {}", path.display()));
    }
    progress.summary(&reporter, started.elapsed());
    if summary.stopped_early {
        progress.failure(STOPPED_EARLY);
    }

    Ok(RunOutcome {
        passed: reporter.passed_count(),
        failed: reporter.failed_count(),
        skipped: reporter.skipped_count(),
        stopped_early: summary.stopped_early,
        reports,
    })
}

/// One line per built-in scenario matching the filter
#[must_use]
pub fn list_scenarios(args: &ListArgs) -> Vec<String> {
    suite::builtin()
        .iter()
        .filter(|s| matches_filter(s.as_ref(), args.filter.as_deref()))
        .map(|s| {
            let meta = s.meta();
            format!(
                "{:<36} {} / {} / {}",
                s.name(),
                meta.epic,
                meta.feature,
                meta.severity
            )
        })
        .collect()
}

/// Effective configuration as YAML
///
/// # Errors
///
/// Returns error if the configuration is invalid
pub fn show_config(args: &ConfigArgs) -> CliResult<String> {
    let config = resolve_suite_config(&args.suite)?;
    Ok(config.to_yaml()?)
}
