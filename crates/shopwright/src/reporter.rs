//! Scenario reporting.
//!
//! The runner emits a [`ScenarioEvent`] stream; [`Reporter`] folds it into
//! [`ScenarioRecord`]s and renders HTML, JUnit XML and JSON run reports.
//!
//! ```text
//! Started ──► Passed
//!        └──► Failed { error, screenshot? }
//! Skipped (never started)
//! ```
//!
//! With [`FailureMode::StopOnFirst`] the first failure makes [`Reporter::record`]
//! return an error so the runner stops scheduling scenarios.

use crate::result::{ShopError, ShopResult};
use crate::scenario::ScenarioMeta;
use crate::session::Screenshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// File name prefix of run reports
pub const REPORT_PREFIX: &str = "ShopwrightReport";

/// What happens after a failing scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailureMode {
    /// Stop scheduling after the first failure
    StopOnFirst,
    /// Run everything and collect all failures
    #[default]
    CollectAll,
}

impl FailureMode {
    /// Mode for a `continue_on_failure` setting
    #[must_use]
    pub const fn from_continue(keep_going: bool) -> Self {
        if keep_going {
            Self::CollectAll
        } else {
            Self::StopOnFirst
        }
    }
}

/// Scenario result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioStatus {
    /// Scenario passed
    Passed,
    /// Scenario failed
    Failed,
    /// Scenario was not run
    Skipped,
}

impl ScenarioStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Check if status is skipped
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

/// Lifecycle event of one scenario
#[derive(Debug, Clone)]
pub enum ScenarioEvent {
    /// Scenario about to run
    Started {
        /// Scenario name
        name: String,
        /// Scenario metadata
        meta: ScenarioMeta,
    },
    /// Scenario passed
    Passed {
        /// Scenario name
        name: String,
        /// Time across all attempts
        duration: Duration,
        /// Attempts used
        attempts: u32,
    },
    /// Scenario failed on its last attempt
    Failed {
        /// Scenario name
        name: String,
        /// Time across all attempts
        duration: Duration,
        /// Attempts used
        attempts: u32,
        /// Error of the last attempt
        error: String,
        /// Failure screenshot, if one was saved
        screenshot: Option<PathBuf>,
    },
    /// Scenario not run
    Skipped {
        /// Scenario name
        name: String,
        /// Scenario metadata
        meta: ScenarioMeta,
        /// Why it was not run
        reason: String,
    },
}

/// Result of one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRecord {
    /// Scenario name
    pub name: String,
    /// Final status
    pub status: ScenarioStatus,
    /// Time across all attempts
    pub duration: Duration,
    /// Attempts used
    pub attempts: u32,
    /// Error message if failed, reason if skipped
    pub error: Option<String>,
    /// Failure screenshot path
    pub screenshot: Option<PathBuf>,
    /// Epic/feature/severity
    pub meta: ScenarioMeta,
    /// When the scenario finished
    pub finished_at: DateTime<Utc>,
}

impl ScenarioRecord {
    fn with_status(name: impl Into<String>, status: ScenarioStatus, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status,
            duration,
            attempts: 1,
            error: None,
            screenshot: None,
            meta: ScenarioMeta::default(),
            finished_at: Utc::now(),
        }
    }

    /// Create a passing record
    #[must_use]
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self::with_status(name, ScenarioStatus::Passed, duration)
    }

    /// Create a failing record
    #[must_use]
    pub fn failed(name: impl Into<String>, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::with_status(name, ScenarioStatus::Failed, duration)
        }
    }

    /// Create a skipped record
    #[must_use]
    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            attempts: 0,
            ..Self::with_status(name, ScenarioStatus::Skipped, Duration::ZERO)
        }
    }

    /// Attach scenario metadata
    #[must_use]
    pub fn with_meta(mut self, meta: ScenarioMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Set the number of attempts
    #[must_use]
    pub const fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Attach a screenshot path
    #[must_use]
    pub fn with_screenshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot = Some(path.into());
        self
    }
}

/// Output format of a run report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportFormat {
    /// Standalone HTML page
    Html,
    /// JUnit XML for CI
    Junit,
    /// JSON document
    Json,
}

impl ReportFormat {
    /// Every format
    pub const ALL: [Self; 3] = [Self::Html, Self::Junit, Self::Json];

    /// File extension
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Junit => "xml",
            Self::Json => "json",
        }
    }
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    suite: &'a str,
    run_id: Option<Uuid>,
    started_at: Option<DateTime<Utc>>,
    total: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
    pass_rate: f64,
    duration_ms: u128,
    scenarios: &'a [ScenarioRecord],
}

/// Collects scenario results and renders run reports
#[derive(Debug, Default)]
pub struct Reporter {
    records: Vec<ScenarioRecord>,
    pending: HashMap<String, ScenarioMeta>,
    failure_mode: FailureMode,
    suite_name: String,
    run_id: Option<Uuid>,
    started_at: Option<DateTime<Utc>>,
}

impl Reporter {
    /// Create a reporter (CollectAll mode)
    #[must_use]
    pub fn new() -> Self {
        Self {
            suite_name: "Shopwright Suite".to_string(),
            ..Default::default()
        }
    }

    /// Create a reporter that stops on the first failure
    #[must_use]
    pub fn stop_on_first() -> Self {
        Self::new().with_failure_mode(FailureMode::StopOnFirst)
    }

    /// Create a reporter that collects every failure
    #[must_use]
    pub fn collect_all() -> Self {
        Self::new().with_failure_mode(FailureMode::CollectAll)
    }

    /// Set failure mode
    #[must_use]
    pub const fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Set suite name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.suite_name = name.into();
        self
    }

    /// Failure mode
    #[must_use]
    pub const fn failure_mode(&self) -> FailureMode {
        self.failure_mode
    }

    /// Mark the start of the run
    pub fn start(&mut self) {
        let run_id = Uuid::new_v4();
        tracing::debug!(%run_id, suite = %self.suite_name, "run started");
        self.run_id = Some(run_id);
        self.started_at = Some(Utc::now());
    }

    /// Identifier of the current run, set by [`Reporter::start`]
    #[must_use]
    pub const fn run_id(&self) -> Option<Uuid> {
        self.run_id
    }

    /// Record a finished scenario
    ///
    /// # Errors
    ///
    /// In StopOnFirst mode, returns error if the scenario failed
    pub fn record(&mut self, record: ScenarioRecord) -> ShopResult<()> {
        let failure = record
            .status
            .is_failed()
            .then(|| (record.name.clone(), record.error.clone().unwrap_or_default()));
        self.records.push(record);

        if self.failure_mode == FailureMode::StopOnFirst {
            if let Some((name, error)) = failure {
                return Err(ShopError::assertion(format!(
                    "stopping after first failure: scenario '{name}' failed: {error}"
                )));
            }
        }
        Ok(())
    }

    /// Fold one lifecycle event into the report
    ///
    /// # Errors
    ///
    /// Same as [`Reporter::record`]
    pub fn handle(&mut self, event: ScenarioEvent) -> ShopResult<()> {
        match event {
            ScenarioEvent::Started { name, meta } => {
                tracing::info!(scenario = %name, feature = %meta.feature, "scenario started");
                self.pending.insert(name, meta);
                Ok(())
            }
            ScenarioEvent::Passed {
                name,
                duration,
                attempts,
            } => {
                tracing::info!(scenario = %name, ?duration, attempts, "scenario passed");
                let meta = self.pending.remove(&name).unwrap_or_default();
                self.record(
                    ScenarioRecord::passed(name, duration)
                        .with_meta(meta)
                        .with_attempts(attempts),
                )
            }
            ScenarioEvent::Failed {
                name,
                duration,
                attempts,
                error,
                screenshot,
            } => {
                tracing::error!(scenario = %name, %error, attempts, "scenario failed");
                let meta = self.pending.remove(&name).unwrap_or_default();
                let mut record = ScenarioRecord::failed(name, duration, error)
                    .with_meta(meta)
                    .with_attempts(attempts);
                record.screenshot = screenshot;
                self.record(record)
            }
            ScenarioEvent::Skipped { name, meta, reason } => {
                tracing::warn!(scenario = %name, %reason, "scenario skipped");
                self.record(ScenarioRecord::skipped(name, reason).with_meta(meta))
            }
        }
    }

    /// Number of passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.records.iter().filter(|r| r.status.is_passed()).count()
    }

    /// Number of failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.records.iter().filter(|r| r.status.is_failed()).count()
    }

    /// Number of skipped scenarios
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.records.iter().filter(|r| r.status.is_skipped()).count()
    }

    /// Number of recorded scenarios
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    /// Passed share of executed (non-skipped) scenarios, 0.0 to 1.0
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        let executed = self.total_count() - self.skipped_count();
        if executed == 0 {
            return 1.0;
        }
        self.passed_count() as f64 / executed as f64
    }

    /// Check if no scenario failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Sum of scenario durations
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.records.iter().map(|r| r.duration).sum()
    }

    /// Recorded scenarios, in completion order
    #[must_use]
    pub fn records(&self) -> &[ScenarioRecord] {
        &self.records
    }

    /// Failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioRecord> {
        self.records.iter().filter(|r| r.status.is_failed()).collect()
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {}/{} passed, {} failed, {} skipped ({:.1}%)",
            self.suite_name,
            self.passed_count(),
            self.total_count(),
            self.failed_count(),
            self.skipped_count(),
            self.pass_rate() * 100.0
        )
    }

    /// Render the HTML report
    #[must_use]
    pub fn render_html(&self) -> String {
        let mut html = String::new();

        html.push_str(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Shopwright Report</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }
        .summary { background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .progress-bar { background: #ddd; height: 20px; border-radius: 10px; overflow: hidden; }
        .passed { background: #4caf50; height: 100%; }
        .scenario { padding: 10px; margin: 5px 0; border-radius: 4px; }
        .scenario.pass { background: #e8f5e9; border-left: 4px solid #4caf50; }
        .scenario.fail { background: #ffebee; border-left: 4px solid #f44336; }
        .scenario.skip { background: #fff3e0; border-left: 4px solid #ff9800; }
        .meta { color: #666; font-size: 0.9em; }
        .error { color: #d32f2f; font-family: monospace; white-space: pre-wrap; }
    </style>
</head>
<body>
"#,
        );

        html.push_str(&format!(
            r#"<div class="summary">
    <h1>{}</h1>
    <h2>Results: {}/{} passed, {} failed, {} skipped ({:.1}%)</h2>
    <div class="progress-bar">
        <div class="passed" style="width: {:.1}%"></div>
    </div>
    <p>Duration: {:.2}s</p>
</div>
"#,
            escape_xml(&self.suite_name),
            self.passed_count(),
            self.total_count(),
            self.failed_count(),
            self.skipped_count(),
            self.pass_rate() * 100.0,
            self.pass_rate() * 100.0,
            self.total_duration().as_secs_f64()
        ));

        html.push_str("<h2>Scenarios</h2>\n");
        for record in &self.records {
            let class = match record.status {
                ScenarioStatus::Passed => "pass",
                ScenarioStatus::Failed => "fail",
                ScenarioStatus::Skipped => "skip",
            };
            html.push_str(&format!(
                r#"<div class="scenario {}">
    <strong>{}</strong> - {:?} ({:.2}ms, {} attempt(s))
    <div class="meta">{} / {} / {}</div>
"#,
                class,
                escape_xml(&record.name),
                record.status,
                record.duration.as_secs_f64() * 1000.0,
                record.attempts,
                escape_xml(&record.meta.epic),
                escape_xml(&record.meta.feature),
                record.meta.severity
            ));
            if let Some(error) = &record.error {
                html.push_str(&format!(
                    "    <div class=\"error\">{}</div>\n",
                    escape_xml(error)
                ));
            }
            if let Some(path) = &record.screenshot {
                let src = escape_xml(&path.display().to_string());
                html.push_str(&format!(
                    "    <div><img src=\"{src}\" alt=\"failure screenshot\" width=\"480\"></div>\n"
                ));
            }
            html.push_str("</div>\n");
        }

        html.push_str(
            r"
<footer>
    <p>Generated by Shopwright</p>
</footer>
</body>
</html>
",
        );
        html
    }

    /// Render JUnit XML
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<testsuite name="{}" tests="{}" failures="{}" skipped="{}" time="{:.3}">"#,
            escape_xml(&self.suite_name),
            self.total_count(),
            self.failed_count(),
            self.skipped_count(),
            self.total_duration().as_secs_f64()
        ));
        xml.push('\n');

        for record in &self.records {
            xml.push_str(&format!(
                r#"  <testcase name="{}" classname="{}" time="{:.3}">"#,
                escape_xml(&record.name),
                escape_xml(&record.meta.feature),
                record.duration.as_secs_f64()
            ));
            xml.push('\n');

            match (record.status, &record.error) {
                (ScenarioStatus::Failed, error) => {
                    let error = escape_xml(error.as_deref().unwrap_or_default());
                    xml.push_str(&format!(
                        "    <failure message=\"{error}\">{error}</failure>\n"
                    ));
                }
                (ScenarioStatus::Skipped, reason) => {
                    let reason = escape_xml(reason.as_deref().unwrap_or_default());
                    xml.push_str(&format!("    <skipped message=\"{reason}\"/>\n"));
                }
                (ScenarioStatus::Passed, _) => {}
            }

            xml.push_str("  </testcase>\n");
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    /// Render the JSON report
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn render_json(&self) -> ShopResult<String> {
        let doc = ReportDocument {
            suite: &self.suite_name,
            run_id: self.run_id,
            started_at: self.started_at,
            total: self.total_count(),
            passed: self.passed_count(),
            failed: self.failed_count(),
            skipped: self.skipped_count(),
            pass_rate: self.pass_rate(),
            duration_ms: self.total_duration().as_millis(),
            scenarios: &self.records,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Render one format
    ///
    /// # Errors
    ///
    /// Returns error if JSON serialization fails
    pub fn render(&self, format: ReportFormat) -> ShopResult<String> {
        match format {
            ReportFormat::Html => Ok(self.render_html()),
            ReportFormat::Junit => Ok(self.render_junit()),
            ReportFormat::Json => self.render_json(),
        }
    }

    /// Write `ShopwrightReport_<timestamp>.<ext>` for each format into `dir`
    ///
    /// # Errors
    ///
    /// Returns error if the directory or a file cannot be written
    pub fn write_all(&self, dir: &Path, formats: &[ReportFormat]) -> ShopResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let stem = report_stem(self.started_at.unwrap_or_else(Utc::now));
        let mut written = Vec::with_capacity(formats.len());
        for format in formats {
            let path = dir.join(format!("{stem}.{}", format.extension()));
            std::fs::write(&path, self.render(*format)?)?;
            tracing::info!(path = %path.display(), "report written");
            written.push(path);
        }
        Ok(written)
    }
}

/// `ShopwrightReport_<yyyyMMdd_HHmmss>`
#[must_use]
pub fn report_stem(at: DateTime<Utc>) -> String {
    format!("{REPORT_PREFIX}_{}", at.format("%Y%m%d_%H%M%S"))
}

fn file_safe(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// `<Feature>_<scenario>_<yyyyMMdd_HHmmss>.png`
#[must_use]
pub fn screenshot_file_name(feature: &str, scenario: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}.png",
        file_safe(feature),
        file_safe(scenario),
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Save a failure screenshot under `dir`
///
/// # Errors
///
/// Returns error if the directory or file cannot be written
pub fn save_screenshot(
    dir: &Path,
    meta: &ScenarioMeta,
    scenario: &str,
    screenshot: &Screenshot,
) -> ShopResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(screenshot_file_name(&meta.feature, scenario, screenshot.taken_at));
    std::fs::write(&path, &screenshot.data)?;
    tracing::info!(path = %path.display(), bytes = screenshot.size_bytes(), "screenshot saved");
    Ok(path)
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Severity;
    use chrono::TimeZone;

    fn meta(feature: &str) -> ScenarioMeta {
        ScenarioMeta::new("Shopping", feature, Severity::Critical)
    }

    mod failure_mode_tests {
        use super::*;

        #[test]
        fn test_from_continue() {
            assert_eq!(FailureMode::from_continue(true), FailureMode::CollectAll);
            assert_eq!(FailureMode::from_continue(false), FailureMode::StopOnFirst);
            assert_eq!(FailureMode::default(), FailureMode::CollectAll);
        }
    }

    mod record_tests {
        use super::*;

        #[test]
        fn test_failed_record() {
            let r = ScenarioRecord::failed("buy", Duration::from_millis(5), "boom").with_attempts(2);
            assert_eq!(r.status, ScenarioStatus::Failed);
            assert_eq!(r.error.as_deref(), Some("boom"));
            assert_eq!(r.attempts, 2);
        }

        #[test]
        fn test_skipped_record() {
            let r = ScenarioRecord::skipped("buy", "filtered");
            assert!(r.status.is_skipped());
            assert_eq!(r.attempts, 0);
            assert_eq!(r.duration, Duration::ZERO);
        }
    }

    mod reporter_tests {
        use super::*;

        #[test]
        fn test_stop_on_first_failure() {
            let mut reporter = Reporter::stop_on_first();
            assert!(reporter.record(ScenarioRecord::passed("a", Duration::ZERO)).is_ok());
            assert!(reporter.record(ScenarioRecord::failed("b", Duration::ZERO, "x")).is_err());
            assert_eq!(reporter.total_count(), 2);
        }

        #[test]
        fn test_collect_all_continues() {
            let mut reporter = Reporter::collect_all();
            reporter.record(ScenarioRecord::failed("a", Duration::ZERO, "x")).unwrap();
            reporter.record(ScenarioRecord::passed("b", Duration::ZERO)).unwrap();
            assert_eq!(reporter.failed_count(), 1);
            assert_eq!(reporter.passed_count(), 1);
            assert!(!reporter.all_passed());
        }

        #[test]
        fn test_pass_rate_ignores_skipped() {
            let mut reporter = Reporter::new();
            reporter.record(ScenarioRecord::passed("a", Duration::ZERO)).unwrap();
            reporter.record(ScenarioRecord::passed("b", Duration::ZERO)).unwrap();
            reporter.record(ScenarioRecord::failed("c", Duration::ZERO, "x")).unwrap();
            reporter.record(ScenarioRecord::passed("d", Duration::ZERO)).unwrap();
            reporter.record(ScenarioRecord::skipped("e", "filtered")).unwrap();
            assert!((reporter.pass_rate() - 0.75).abs() < f64::EPSILON);
        }

        #[test]
        fn test_pass_rate_empty() {
            assert!((Reporter::new().pass_rate() - 1.0).abs() < f64::EPSILON);
        }

        #[test]
        fn test_events_carry_metadata() {
            let mut reporter = Reporter::new();
            reporter
                .handle(ScenarioEvent::Started {
                    name: "checkout".to_string(),
                    meta: meta("Purchase"),
                })
                .unwrap();
            reporter
                .handle(ScenarioEvent::Failed {
                    name: "checkout".to_string(),
                    duration: Duration::from_millis(30),
                    attempts: 2,
                    error: "Purchase confirmation did not appear".to_string(),
                    screenshot: Some(PathBuf::from("shots/a.png")),
                })
                .unwrap();
            let r = &reporter.records()[0];
            assert_eq!(r.meta.feature, "Purchase");
            assert_eq!(r.attempts, 2);
            assert_eq!(r.screenshot.as_deref(), Some(Path::new("shots/a.png")));
        }

        #[test]
        fn test_summary() {
            let mut reporter = Reporter::new().with_name("Demo");
            reporter.record(ScenarioRecord::passed("a", Duration::ZERO)).unwrap();
            reporter.record(ScenarioRecord::skipped("b", "filtered")).unwrap();
            let summary = reporter.summary();
            assert!(summary.contains("Demo"));
            assert!(summary.contains("1/2 passed"));
            assert!(summary.contains("1 skipped"));
            assert!(summary.contains("100.0%"));
        }
    }

    mod render_tests {
        use super::*;

        fn reporter() -> Reporter {
            let mut reporter = Reporter::new().with_name("Render <Suite>");
            reporter
                .record(ScenarioRecord::passed("ok_case", Duration::from_millis(50)).with_meta(meta("Category")))
                .unwrap();
            reporter
                .record(ScenarioRecord::failed("bad_case", Duration::from_millis(10), "total 1 < 2"))
                .unwrap();
            reporter.record(ScenarioRecord::skipped("later", "filtered")).unwrap();
            reporter
        }

        #[test]
        fn test_render_html_escapes() {
            let html = reporter().render_html();
            assert!(html.contains("Render &lt;Suite&gt;"));
            assert!(html.contains("ok_case"));
            assert!(html.contains("total 1 &lt; 2"));
            assert!(html.contains("Shopping / Category / critical"));
        }

        #[test]
        fn test_render_junit() {
            let xml = reporter().render_junit();
            assert!(xml.contains(r#"tests="3" failures="1" skipped="1""#));
            assert!(xml.contains(r#"<failure message="total 1 &lt; 2">"#));
            assert!(xml.contains(r#"<skipped message="filtered"/>"#));
        }

        #[test]
        fn test_render_json() {
            let json: serde_json::Value = serde_json::from_str(&reporter().render_json().unwrap()).unwrap();
            assert_eq!(json["total"], 3);
            assert_eq!(json["failed"], 1);
            assert_eq!(json["scenarios"][0]["name"], "ok_case");
        }

        #[test]
        fn test_write_all() {
            let dir = tempfile::tempdir().unwrap();
            let mut r = reporter();
            r.start();
            assert!(r.run_id().is_some());
            let written = r.write_all(dir.path(), &ReportFormat::ALL).unwrap();
            assert_eq!(written.len(), 3);
            for path in &written {
                assert!(path.exists());
                let name = path.file_name().unwrap().to_string_lossy().to_string();
                assert!(name.starts_with("ShopwrightReport_"));
            }
        }
    }

    mod file_name_tests {
        use super::*;

        #[test]
        fn test_report_stem() {
            let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
            assert_eq!(report_stem(at), "ShopwrightReport_20240309_140507");
        }

        #[test]
        fn test_screenshot_file_name() {
            let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
            assert_eq!(
                screenshot_file_name("Cart & Checkout", "empty cart", at),
                "Cart___Checkout_empty_cart_20240309_140507.png"
            );
        }

        #[test]
        fn test_save_screenshot() {
            let dir = tempfile::tempdir().unwrap();
            let shot = Screenshot::new(vec![1, 2, 3]);
            let path = save_screenshot(dir.path(), &meta("Purchase"), "buy", &shot).unwrap();
            assert!(path.file_name().unwrap().to_string_lossy().starts_with("Purchase_buy_"));
            assert_eq!(std::fs::read(path).unwrap(), vec![1, 2, 3]);
        }
    }
}
