//! Built-in suite against the simulated storefront

#![allow(clippy::unwrap_used, clippy::expect_used)]

use shopwright::{
    suite, FailureMode, Reporter, ScenarioRunner, ScenarioStatus, SimulatedFactory,
    StorefrontFaults, SuiteConfig,
};
use std::sync::Arc;
use std::time::Duration;

fn config(dir: &std::path::Path) -> SuiteConfig {
    SuiteConfig::default()
        .with_base_url("https://demo.test/")
        .with_timeout_seconds(2)
        .with_poll_interval_ms(10)
        .with_thread_count(4)
        .with_screenshot_dir(dir.join("screenshots"))
        .with_report_dir(dir.to_path_buf())
}

async fn run(factory: SimulatedFactory, dir: &std::path::Path) -> (Reporter, Arc<SimulatedFactory>) {
    let factory = Arc::new(factory);
    let runner = ScenarioRunner::new(config(dir), factory.clone());
    let mut reporter = Reporter::collect_all();
    runner.run(&suite::builtin(), &mut reporter).await;
    (reporter, factory)
}

fn status_of(reporter: &Reporter, name: &str) -> ScenarioStatus {
    reporter
        .records()
        .iter()
        .find(|r| r.name == name)
        .map(|r| r.status)
        .unwrap_or_else(|| panic!("no record for {name}"))
}

// ============================================================================
// Healthy storefront
// ============================================================================

#[tokio::test]
async fn test_whole_suite_passes() {
    let dir = tempfile::tempdir().unwrap();
    let (reporter, factory) = run(SimulatedFactory::new(), dir.path()).await;

    let failures: Vec<_> = reporter
        .failures()
        .iter()
        .map(|r| format!("{}: {}", r.name, r.error.clone().unwrap_or_default()))
        .collect();
    assert!(failures.is_empty(), "failures: {failures:#?}");
    assert_eq!(reporter.passed_count(), suite::builtin().len());
    assert_eq!(factory.created().len(), suite::builtin().len());
    assert!(factory.created().iter().all(|s| s.is_closed()));
}

#[tokio::test]
async fn test_suite_passes_with_render_delay() {
    let dir = tempfile::tempdir().unwrap();
    let factory = SimulatedFactory::new().with_render_delay(Duration::from_millis(60));
    let (reporter, _) = run(factory, dir.path()).await;
    assert!(reporter.all_passed(), "{}", reporter.summary());
}

#[tokio::test]
async fn test_suite_passes_with_stale_grids() {
    let dir = tempfile::tempdir().unwrap();
    let factory = SimulatedFactory::new()
        .with_render_delay(Duration::from_millis(60))
        .with_stale_grid();
    let (reporter, _) = run(factory, dir.path()).await;
    assert!(reporter.all_passed(), "{}", reporter.summary());
}

#[tokio::test]
async fn test_reports_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let (reporter, _) = run(SimulatedFactory::new(), dir.path()).await;
    let written = reporter
        .write_all(dir.path(), &shopwright::ReportFormat::ALL)
        .unwrap();
    assert_eq!(written.len(), 3);
    let junit = std::fs::read_to_string(
        written
            .iter()
            .find(|p| p.extension().is_some_and(|e| e == "xml"))
            .unwrap(),
    )
    .unwrap();
    assert!(junit.contains("purchase_samsung_galaxy_s6"));
}

// ============================================================================
// Faulty storefronts
// ============================================================================

#[tokio::test]
async fn test_total_skew_fails_total_checks() {
    let dir = tempfile::tempdir().unwrap();
    let factory = SimulatedFactory::new().with_faults(StorefrontFaults {
        total_skew: 5.0,
        ..StorefrontFaults::default()
    });
    let (reporter, _) = run(factory, dir.path()).await;

    assert_eq!(status_of(&reporter, "cart_total_matches_lines"), ScenarioStatus::Failed);
    assert_eq!(status_of(&reporter, "purchase_samsung_galaxy_s6"), ScenarioStatus::Failed);
    assert_eq!(status_of(&reporter, "every_category_has_products"), ScenarioStatus::Passed);
    assert_eq!(status_of(&reporter, "profile_set_and_get"), ScenarioStatus::Passed);

    let failed = reporter
        .failures()
        .into_iter()
        .find(|r| r.name == "cart_total_matches_lines")
        .unwrap();
    let shot = failed.screenshot.clone().expect("failure screenshot");
    assert!(shot.starts_with(dir.path().join("screenshots")));
    assert!(shot.exists());
}

#[tokio::test]
async fn test_rejected_logins_fail_valid_login_only() {
    let dir = tempfile::tempdir().unwrap();
    let factory = SimulatedFactory::new().with_faults(StorefrontFaults {
        reject_logins: true,
        ..StorefrontFaults::default()
    });
    let (reporter, _) = run(factory, dir.path()).await;
    assert_eq!(status_of(&reporter, "valid_login"), ScenarioStatus::Failed);
    assert_eq!(status_of(&reporter, "invalid_login_is_rejected"), ScenarioStatus::Passed);
}

#[tokio::test]
async fn test_missing_confirmation_fails_purchase() {
    let dir = tempfile::tempdir().unwrap();
    let factory = SimulatedFactory::new().with_faults(StorefrontFaults {
        suppress_confirmation: true,
        ..StorefrontFaults::default()
    });
    let (reporter, _) = run(factory, dir.path()).await;
    assert_eq!(status_of(&reporter, "purchase_samsung_galaxy_s6"), ScenarioStatus::Failed);
    assert_eq!(status_of(&reporter, "incomplete_form_is_handled"), ScenarioStatus::Passed);
    assert_eq!(status_of(&reporter, "empty_cart_cannot_check_out"), ScenarioStatus::Passed);
}

#[tokio::test]
async fn test_unexpected_acknowledgement_fails_cart_scenarios() {
    let dir = tempfile::tempdir().unwrap();
    let factory = SimulatedFactory::new().with_faults(StorefrontFaults {
        unexpected_acknowledgement: Some("Out of stock".to_string()),
        ..StorefrontFaults::default()
    });
    let (reporter, _) = run(factory, dir.path()).await;
    let failed = reporter
        .failures()
        .into_iter()
        .find(|r| r.name == "repeated_additions_accumulate")
        .unwrap();
    assert!(failed.error.as_deref().unwrap().contains("Out of stock"));
    assert_eq!(status_of(&reporter, "direct_cart_url_is_empty"), ScenarioStatus::Passed);
}

#[tokio::test]
async fn test_stop_on_first_failure_skips_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let factory = Arc::new(SimulatedFactory::new().with_faults(StorefrontFaults {
        total_skew: 5.0,
        ..StorefrontFaults::default()
    }));
    let runner = ScenarioRunner::new(config(dir.path()).with_thread_count(1), factory)
        .with_filter(Some("Purchase".to_string()));
    let mut reporter = Reporter::new().with_failure_mode(FailureMode::StopOnFirst);
    let summary = runner.run(&suite::builtin(), &mut reporter).await;

    assert!(summary.stopped_early);
    assert_eq!(reporter.failed_count(), 1);
    assert_eq!(reporter.passed_count(), 0);
}
